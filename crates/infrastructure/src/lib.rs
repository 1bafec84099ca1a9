//! Ferrous Fanmerge Infrastructure Layer
//!
//! Fan-out/merge core, eligibility filtering, wire transports and upstream clients.
pub mod dns;
