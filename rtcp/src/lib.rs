#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod compound_packet;
mod error;
pub mod goodbye;
pub mod header;
pub mod packet;
pub mod picture_loss_indication;
pub mod rapid_resynchronization_request;
pub mod raw_packet;
pub mod reader;
pub mod reception_report;
pub mod receiver_report;
pub mod sender_report;
pub mod slice_loss_indication;
pub mod source_description;
pub mod transport_layer_nack;
mod util;

pub use error::{Error, Result};
pub use packet::{marshal, unmarshal, Packet, RtcpPacket};
