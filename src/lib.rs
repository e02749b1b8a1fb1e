//! A streaming kernel library for image processing and small neural-network
//! inference, built around a uniform `Elem<T, N>` stream element and
//! monomorphic, `const`-generic operators.
//!
//! Every operator is a plain function (or a small struct for the ones that
//! carry state across batches, like [`fullyconnected::FullyConnected`] and
//! [`keypoint`]'s port activity) over iterators of [`element::Elem`]; none
//! of them produce a run-time error once their build-time parameter block
//! has validated (spec §7). The one fallible collaborator outside that
//! discipline is [`pgm`], the binary P5 reader/writer.

pub mod element;
pub mod error;
pub mod fixed;

pub mod buffer;
pub mod window;

pub mod channel;
pub mod color;
pub mod vector_width;

pub mod depth;
pub mod pixelwise;
pub mod scale;

pub mod conv;
pub mod pooling;
pub mod batchnorm;
pub mod activation;
pub mod softmax;
pub mod fullyconnected;

pub mod keypoint;

pub mod pgm;

pub use element::{Elem, Scalar, ScalarKind};
pub use error::{ConfigError, PgmError};
pub use fixed::{OverflowPolicy, RoundPolicy};
