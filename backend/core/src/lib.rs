pub mod date;
pub mod digits;
pub mod error;
pub mod image;
pub mod json_extract;
pub mod traits;
pub mod types;

pub use date::{normalize_date, normalize_field, DRIVING_LICENSE_DATE_FORMAT, PASSPORT_DATE_FORMAT};
pub use digits::first_digit_run;
pub use error::OcrError;
pub use image::ImageRef;
pub use json_extract::{extract_json, parse_embedded};
pub use traits::{VisionBackend, VisionReply, VisionRequest};
pub use types::{
    DrivingLicenseBack, DrivingLicenseCard, DrivingLicenseFace, DrivingLicenseRecord,
    PassportRecord,
};
