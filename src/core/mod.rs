//! # Core Components
//!
//! Schema registry, flag packing, the object-coder seam, and the packet
//! serializer itself.
//!
//! ## Components
//! - **Flags**: 8-slot boolean flag byte packing
//! - **Schema**: insertion-ordered registry of id to sorted field list
//! - **Coder**: `ObjectCoder` trait and the MessagePack default
//! - **Packet**: serialize/deserialize orchestration and header parsing
//!
//! ## Wire Format
//! ```text
//! [Version(1)] [Flags(1)] [CRC32(4)?] [SchemaId(4)?] [Payload(N)]
//! ```

pub mod coder;
pub mod flags;
pub mod packet;
pub mod schema;
