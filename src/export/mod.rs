//! Dataset export: repackage recorded takes into a trainer's zip layout.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_dataset_studio::export::{DatasetExporter, ExportFormat, ExportRequest};
//! use voice_dataset_studio::project::Project;
//!
//! let project = Project::load("/data/my-voice").unwrap();
//! let request = ExportRequest::new(
//!     "/tmp/dataset.zip",
//!     &project.path,
//!     project.items.clone(),
//!     ExportFormat::Piper,
//! )
//! .with_speaker("Ashan");
//!
//! let path = DatasetExporter::default().export(&request).unwrap();
//! println!("wrote {}", path.display());
//! ```

pub mod exporter;
pub mod format;
pub mod metadata;
pub mod speaker;

pub use exporter::{export_dataset_to_path, DatasetExporter, ExportError, ExportRequest};
pub use format::{ExportFormat, DATASET_ROOT};
pub use metadata::{f5_json, ljspeech_csv, metadata_file, piper_csv, xtts_csv, DatasetEntry};
pub use speaker::{sanitize_speaker_name, DEFAULT_SPEAKER};
