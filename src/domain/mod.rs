// ============================================================
// Layer 3: Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define what the
// detector works with. No Burn types and no file I/O here.

// Authorship labels and normalised (text, label) rows
pub mod record;

// Raw column/cell tables as read from dataset files
pub mod table;

// Probability → Human / Mixed / AI tiers
pub mod verdict;

// Keyword-counting fallback scorer
pub mod heuristic;

// Core abstractions (traits) that other layers implement
pub mod traits;
