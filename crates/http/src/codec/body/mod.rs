//! HTTP body handling module for assembling incoming payloads
//!
//! # Components
//!
//! - [`LengthDecoder`](length_decoder::LengthDecoder): fixed-length payloads
//! - [`ChunkedDecoder`](chunked_decoder::ChunkedDecoder): chunked transfer encoded payloads
//! - [`PayloadDecoder`]: picks one of the above from the declared framing
//! - [`BodyAssembler`]: buffers reads and drives the decoders into a message body

mod body_assembler;
mod chunked_decoder;
mod length_decoder;
mod payload_decoder;

pub use body_assembler::BodyAssembler;
pub use payload_decoder::PayloadDecoder;
