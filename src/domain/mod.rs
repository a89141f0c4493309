// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits that define the core concepts
// of the semantic parser.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Think of this layer as the "dictionary" of the system —
// it defines what things ARE, not how they work.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A natural-language query paired with its logical form
pub mod job_query;

// Reserved vocabulary ids shared by every model component
pub mod special_tokens;

// Core abstractions (traits) that other layers implement
pub mod traits;
