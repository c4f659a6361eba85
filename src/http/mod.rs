//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 server: one request per connection, text
//! framing only, no keep-alive, chunking or compression.
//!
//! # Architecture
//!
//! - **`connection`**: Per-socket state machine: wait, read, respond, close
//! - **`parser`**: Splits raw text into start line, headers and body
//! - **`request`**: Parsed client request
//! - **`response`**: Response under construction, with text or binary body
//! - **`writer`**: Writes a serialized response to the client
//! - **`status`**: Status codes, reason phrases and classes
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Waiting   │ ← Poll for first bytes (20 ms, ×1.5, ≤ 10 s)
//!        └──────┬──────┘
//!               │ Data ready          (timeout / hang-up → Closed)
//!               ▼
//!        ┌─────────────┐
//!        │   Reading   │ ← Drain everything currently available
//!        └──────┬──────┘
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Parse, handler chain, root + static resolution
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response, shut down the socket
//!        └──────┬───────────┘
//!               ▼
//!             Closed
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
pub mod status;
pub mod mime;
