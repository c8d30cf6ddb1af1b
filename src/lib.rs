//! This Rust package drives the receive side of a Xilinx HDMI 2.1 pipeline.
//! The [receiver controller](crate::hdmi_rx::RxController) sequences the HDMI RX
//! subsystem and the video PHY through connect, stream and link-training events
//! raised by their interrupts, and reports transitions to the application through
//! trigger callbacks.
//! The hardware drivers themselves stay outside this crate, behind the traits of
//! [`driver_client`].
//!
pub mod driver_client;
pub mod error;
pub mod hdmi_rx;
pub mod utils;
