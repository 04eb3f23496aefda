//! Schema and row engine.
//!
//! This module owns everything below the parser:
//!
//! - Table catalog management ([`Catalog`], [`TableSchema`])
//! - Per-table row storage ([`RowSet`])
//! - Row-level CRUD ([`engine`])
//! - Loading and saving state ([`Persistence`])
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Session                             │
//! │       (dispatches commands, owns catalog and cache)         │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Schema & Row Engine                     │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐          │
//! │  │   Catalog   │  │   engine    │  │   RowSet    │          │
//! │  │  (schemas)  │  │   (CRUD)    │  │ (per-table) │          │
//! │  └─────────────┘  └─────────────┘  └─────────────┘          │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Persistence                          │
//! │           (JsonFileStore on disk, MemoryStore)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod catalog;
pub mod engine;
mod persistence;
mod table;

pub use catalog::{Catalog, ColumnDef, CreateOutcome, DropOutcome, TableSchema};
pub use persistence::{JsonFileStore, MemoryStore, Persistence};
pub use table::RowSet;
