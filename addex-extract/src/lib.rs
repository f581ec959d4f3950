//! # addex-extract
//!
//! Core extraction pipeline for flat, OCR/paste-derived transcripts of
//! Algorithm Design Description documents.
//!
//! The pipeline segments a transcript into individual function/type
//! definitions despite pagination artifacts, normalizes each line,
//! recomputes indentation from block structure, then runs a whole-program
//! fixed-point analysis that threads an implicit context parameter through
//! the call graph of the extracted definitions.
//!
//! For the stage-by-stage walkthrough see the [extract] module; the
//! high-level entry point is [`extract::pipeline::Extraction`].

pub mod extract;
