//! Typed extraction results.
//!
//! Every field is a string; absent, `null`, or non-string values coming
//! back from a model become `""` or their textual form, never an error.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::date::normalize_field;

/// Passport fields returned by `/ocr/passport`.
///
/// Wire names follow the public API (`givename`, `passport_no`); the
/// spelled-out names are accepted from backends as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassportRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub birth_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub surname: String,
    #[serde(rename = "givename", alias = "given_name", default, deserialize_with = "lenient_string")]
    pub given_name: String,
    #[serde(rename = "passport_no", alias = "passport_number", default, deserialize_with = "lenient_string")]
    pub passport_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub expiry_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sex: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nationality: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country_code: String,
}

impl PassportRecord {
    /// Re-render the three date fields; unparseable values are kept as-is.
    pub fn normalize_dates(&mut self, output_format: &str) {
        normalize_field(&mut self.birth_date, output_format);
        normalize_field(&mut self.issue_date, output_format);
        normalize_field(&mut self.expiry_date, output_format);
    }

    /// Constrain `sex` to `F`, `M`, or empty.
    pub fn normalize_sex(&mut self) {
        self.sex = normalize_sex(&self.sex).to_string();
    }
}

/// Canonical driving-license result returned by `/ocr/driving-license`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrivingLicenseRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub license_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_of_birth: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub expiry_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub class: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gender: String,
}

impl DrivingLicenseRecord {
    pub fn normalize_dates(&mut self, output_format: &str) {
        normalize_field(&mut self.date_of_birth, output_format);
        normalize_field(&mut self.issue_date, output_format);
        normalize_field(&mut self.expiry_date, output_format);
    }

    /// Take the free-text fields from a translated copy; identifiers and
    /// dates stay as extracted. Blank translations are ignored.
    pub fn merge_translation(&mut self, translated: DrivingLicenseRecord) {
        let pairs = [
            (&mut self.name, translated.name),
            (&mut self.address, translated.address),
            (&mut self.class, translated.class),
            (&mut self.gender, translated.gender),
        ];
        for (field, value) in pairs {
            if !value.trim().is_empty() {
                *field = value;
            }
        }
    }

    /// Parse either the flat shape or the face/back card shape.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let is_card = value.get("data").is_some_and(Value::is_object)
            || value.get("face").is_some_and(Value::is_object);
        if is_card {
            let card: DrivingLicenseCard = serde_json::from_value(value)?;
            Ok(Self::from(&card))
        } else {
            serde_json::from_value(value)
        }
    }
}

// ---------------------------------------------------------------------------
// Card shape (face/back with image geometry), returned by some providers
// ---------------------------------------------------------------------------

/// A point in image pixel coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
}

/// A recognized key/value pair and its quadrilateral on the image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub key: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
    #[serde(default)]
    pub pos: Vec<Point>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivingLicenseFace {
    #[serde(default, deserialize_with = "lenient_string")]
    pub license_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sex: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nationality: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub birth_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub initial_issue_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub approved_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue_authority: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub valid_from_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub valid_period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivingLicenseBack {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub record_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub record: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub license_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrivingLicenseSides {
    #[serde(default)]
    pub face: DrivingLicenseFace,
    #[serde(default)]
    pub back: DrivingLicenseBack,
}

/// Alternate driving-license shape: face/back fields plus detection metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrivingLicenseCard {
    /// Accepts both `{"data": {"face": …}}` and a bare `{"face": …}`.
    #[serde(default)]
    pub data: Option<DrivingLicenseSides>,
    #[serde(default, skip_serializing)]
    face: Option<DrivingLicenseFace>,
    #[serde(default, skip_serializing)]
    back: Option<DrivingLicenseBack>,
    /// Corner points of the detected card.
    #[serde(default, rename = "sliceRect")]
    pub slice_rect: Vec<Point>,
    #[serde(default, rename = "prism_keyValueInfo")]
    pub key_value_info: Vec<KeyValueInfo>,
    /// 1 when the image is a photocopy.
    #[serde(default)]
    pub ftype: i64,
    /// Rotation: 0 upright, 90 right, 180 down, 270 left.
    #[serde(default)]
    pub angle: i64,
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub width: i64,
    #[serde(default, rename = "orgHeight")]
    pub org_height: i64,
    #[serde(default, rename = "orgWidth")]
    pub org_width: i64,
}

impl DrivingLicenseCard {
    /// Face/back data regardless of whether the `data` wrapper was present.
    pub fn sides(&self) -> DrivingLicenseSides {
        match &self.data {
            Some(sides) => sides.clone(),
            None => DrivingLicenseSides {
                face: self.face.clone().unwrap_or_default(),
                back: self.back.clone().unwrap_or_default(),
            },
        }
    }
}

impl From<&DrivingLicenseCard> for DrivingLicenseRecord {
    fn from(card: &DrivingLicenseCard) -> Self {
        let DrivingLicenseSides { face, back } = card.sides();
        Self {
            name: first_non_empty(face.name, back.name),
            license_number: first_non_empty(face.license_number, back.license_number),
            date_of_birth: face.birth_date,
            issue_date: first_non_empty(face.initial_issue_date, face.valid_from_date),
            expiry_date: validity_end(&face.valid_period).unwrap_or_default(),
            address: face.address,
            class: face.approved_type,
            gender: face.sex,
        }
    }
}

fn first_non_empty(primary: String, fallback: String) -> String {
    if primary.trim().is_empty() {
        fallback
    } else {
        primary
    }
}

/// End date of a validity range such as `2016-01-01至2022-01-01`.
fn validity_end(period: &str) -> Option<String> {
    const SEPARATORS: &[&str] = &["至", " to ", " TO ", "~", " - ", " – "];
    SEPARATORS.iter().find_map(|sep| {
        period
            .rsplit_once(sep)
            .map(|(_, end)| end.trim().to_string())
            .filter(|end| !end.is_empty())
    })
}

/// Map the many ways models spell sex onto `F` / `M`.
pub fn normalize_sex(raw: &str) -> &'static str {
    match raw.trim().to_uppercase().as_str() {
        "F" | "FEMALE" | "女" => "F",
        "M" | "MALE" | "男" => "M",
        _ => "",
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn passport_missing_and_null_fields_become_empty() {
        let record: PassportRecord =
            serde_json::from_value(json!({"surname": "DOE", "sex": null, "passport_no": 123456}))
                .unwrap();
        assert_eq!(record.surname, "DOE");
        assert_eq!(record.sex, "");
        assert_eq!(record.passport_number, "123456");
        assert_eq!(record.nationality, "");
    }

    #[test]
    fn passport_accepts_spelled_out_aliases() {
        let record: PassportRecord =
            serde_json::from_value(json!({"given_name": "JANE", "passport_number": "X1"})).unwrap();
        assert_eq!(record.given_name, "JANE");
        assert_eq!(record.passport_number, "X1");
    }

    #[test]
    fn passport_serializes_with_api_names_and_all_fields() {
        let value = serde_json::to_value(PassportRecord::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 9);
        assert!(obj.contains_key("givename"));
        assert!(obj.contains_key("passport_no"));
    }

    #[test]
    fn sex_is_constrained() {
        assert_eq!(normalize_sex("female"), "F");
        assert_eq!(normalize_sex(" M "), "M");
        assert_eq!(normalize_sex("男"), "M");
        assert_eq!(normalize_sex("X"), "");
    }

    #[test]
    fn flat_license_parses_directly() {
        let record = DrivingLicenseRecord::from_value(json!({
            "name": "JOHN SMITH",
            "license_number": "D123",
            "class": "B"
        }))
        .unwrap();
        assert_eq!(record.name, "JOHN SMITH");
        assert_eq!(record.class, "B");
        assert_eq!(record.address, "");
    }

    #[test]
    fn card_shape_maps_onto_flat_record() {
        let record = DrivingLicenseRecord::from_value(json!({
            "data": {
                "face": {
                    "licenseNumber": "110101199001011234",
                    "name": "ZHANG SAN",
                    "sex": "M",
                    "address": "BEIJING",
                    "birthDate": "1990-01-01",
                    "initialIssueDate": "2010-05-06",
                    "approvedType": "C1",
                    "validPeriod": "2016-05-06至2026-05-06"
                },
                "back": {"name": "ZHANG SAN", "recordNumber": "R1"}
            },
            "angle": 90
        }))
        .unwrap();
        assert_eq!(record.license_number, "110101199001011234");
        assert_eq!(record.issue_date, "2010-05-06");
        assert_eq!(record.expiry_date, "2026-05-06");
        assert_eq!(record.class, "C1");
        assert_eq!(record.gender, "M");
    }

    #[test]
    fn bare_face_without_data_wrapper() {
        let record = DrivingLicenseRecord::from_value(json!({
            "face": {"name": "", "validFromDate": "2015-01-01"},
            "back": {"name": "LI SI", "licenseNumber": "L9"}
        }))
        .unwrap();
        assert_eq!(record.name, "LI SI");
        assert_eq!(record.license_number, "L9");
        assert_eq!(record.issue_date, "2015-01-01");
        assert_eq!(record.expiry_date, "");
    }

    #[test]
    fn translation_only_touches_free_text() {
        let mut record = DrivingLicenseRecord {
            name: "张三".into(),
            license_number: "D1".into(),
            date_of_birth: "1990-01-01".into(),
            address: "北京".into(),
            ..Default::default()
        };
        record.merge_translation(DrivingLicenseRecord {
            name: "Zhang San".into(),
            license_number: "WRONG".into(),
            date_of_birth: "01/01/1990".into(),
            address: "Beijing".into(),
            class: "".into(),
            ..Default::default()
        });
        assert_eq!(record.name, "Zhang San");
        assert_eq!(record.address, "Beijing");
        assert_eq!(record.license_number, "D1");
        assert_eq!(record.date_of_birth, "1990-01-01");
    }

    #[test]
    fn license_dates_normalize_and_keep_unparseable() {
        let mut record = DrivingLicenseRecord {
            date_of_birth: "08 JUN 1996".into(),
            issue_date: "sometime".into(),
            ..Default::default()
        };
        record.normalize_dates("YYYY.MM.DD");
        assert_eq!(record.date_of_birth, "1996.06.08");
        assert_eq!(record.issue_date, "sometime");
    }
}
