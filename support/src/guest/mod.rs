//! Types and utilities for implementing a proc-block.

mod element_type;
mod errors;
mod logging;
mod metadata;
pub mod parse;
mod proc_block;
mod tensor;

pub use self::{
    element_type::{ElementType, ElementTypeConstraint, PrimitiveTensorElement},
    errors::{
        ArgumentError, ArgumentErrorReason, CreateError, InvalidInput,
        InvalidInputReason, RunError,
    },
    logging::initialize_logger,
    metadata::{
        Argument, ArgumentHint, ArgumentMetadata, ArgumentType, Dimensions,
        Metadata, TensorConstraint, TensorConstraints, TensorHint,
        TensorMetadata,
    },
    proc_block::ProcBlock,
    tensor::Tensor,
};
