#![doc = include_str!("../README.md")]

pub extern crate ndarray;

pub mod guest;
mod macros;
mod strings;

pub use crate::strings::{decode_strings, StringBuilder};
