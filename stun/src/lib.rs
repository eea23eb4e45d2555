#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod attributes;
pub mod client;
mod error;
pub mod fingerprint;
pub mod integrity;
pub mod message;

pub use error::{Error, Result};
pub use message::{is_message, Message, MessageClass, Method, TransactionId, METHOD_BINDING};
