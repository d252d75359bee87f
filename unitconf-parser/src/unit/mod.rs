//! Main module for unitconf library functionality

pub mod lexing;
pub mod range;
pub mod testing;
pub mod token;
