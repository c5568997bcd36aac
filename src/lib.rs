//! A master-side implementation of IEC 60870-5-103, the companion standard for the informative
//! interface of protection equipment.
//!
//! This crate drives the FT1.2 asynchronous balanced link layer, the ASDU application layer
//! built on top of it, and the multi-ASDU disturbance record transfer dialog, then assembles
//! completed disturbance records into COMTRADE 1999 ASCII files.
//!
//! # Feature flags
//!
//! - `std` (default): enables a concrete [`serialport`](transport::SerialTransport) byte channel,
//!   `log`-based logging, and COMTRADE file export to disk.
//! - `defmt`: routes logging through `defmt` instead of `log`, for `no_std` targets.
//! - `serde`: derives `Serialize` on the public data model, for dumping captured records.
//!
//! Exactly one of `std` or `defmt` determines which logging backend [`fmt`] forwards to; a
//! `no_std` build should disable default features and enable `defmt`.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

mod application;
mod asdu;
mod error;
mod ft12;
mod link;
mod transport;

#[cfg(feature = "std")]
mod comtrade;
#[cfg(feature = "std")]
mod disturbance;
#[cfg(feature = "std")]
mod std_transport;

pub use crate::application::{
    ApplicationConfig, ApplicationManager, Command, FunctionType, Timeouts,
};
pub use crate::asdu::{
    AsduHeader, Cause, Cp56Time2a, Dui, Ifi, InformationNumber, CP56TIME2A_LEN,
};
pub use crate::error::{AbortCode, Error, FrameError, ProtocolError};
pub use crate::ft12::{ControlByte, Frame};
pub use crate::link::{LinkLayer, LinkLayerConfig};
pub use crate::transport::ByteChannel;

#[cfg(feature = "std")]
pub use crate::comtrade::{save_comtrade, AnalogChannel, DigitalChannel, SamplingRate};
#[cfg(feature = "std")]
pub use crate::disturbance::{
    Channel, DisturbanceAssembler, DisturbanceOrder, DisturbanceRecord, Progress, Tag, TagBlock,
};

#[cfg(feature = "std")]
pub use crate::std_transport::SerialTransport;

/// The link address width used throughout this crate.
///
/// IEC 60870-5-103 permits one or two octet link addresses; this implementation only supports
/// the one octet form, which covers every profile observed in `original_source`.
pub type LinkAddress = u8;
