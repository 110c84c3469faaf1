// ============================================================
// Layer 2: Application / Use Cases
// ============================================================
// Orchestrates the other layers for one user goal each.
//
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

/// Load → normalise → clean → sample, shared by train and prepare
pub mod corpus;

/// The training workflow
pub mod train_use_case;

/// Request validation and scoring (heuristic or model)
pub mod detect_use_case;

/// Dataset normalisation to a flat text,label CSV
pub mod prepare_use_case;
