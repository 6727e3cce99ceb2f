//! Extraction instructions sent alongside the image.

use crate::profile::{LicenseSchema, PromptLocale};

const DIGITS_EN: &str = "Return only the number from the image";

const DIGITS_ZH: &str = "只返回数字";

const PASSPORT_EN: &str = "Return in English JSON format: birth_date, surname (uppercase letters), \
givename (uppercase letters), passport_no, issue_date, expiry_date, sex (only F or M), \
nationality, country_code. Date format: 23/01/1994. Do not include patronymic name.";

const PASSPORT_ZH: &str = "用英文json格式返回出生日期(birth_date)、姓(surname, 字母大写)、\
名(givename, 字母大写)、护照号(passport_no)、发行日(issue_date)、过期日(expiry_date)、\
性别(sex, 只有F或者M)、国籍(nationality)、国家代号(country_code), 日期格式: 23/01/1994, \
不需要patronymic name";

const LICENSE_FLAT_EN: &str = "Return in English JSON format: name, license_number, \
date_of_birth, issue_date, expiry_date, address, class, gender. Date format: 23/01/1994. \
If information is not present, leave an empty string.";

const LICENSE_FLAT_ZH: &str = "用英文json格式返回姓名(name)、证号(license_number)、\
出生日期(date_of_birth)、发证日期(issue_date)、有效期至(expiry_date)、住址(address)、\
准驾车型(class)、性别(gender), 日期格式: 23/01/1994, 没有的信息返回空字符串";

const LICENSE_STRUCTURED_EN: &str = r#"Return in English JSON format: {"data": {"face": {"licenseNumber": "", "name": "", "sex": "", "nationality": "", "address": "", "birthDate": "", "initialIssueDate": "", "approvedType": "", "issueAuthority": "", "validFromDate": "", "validPeriod": ""}, "back": {"name": "", "recordNumber": "", "record": "", "licenseNumber": ""}}}. Use uppercase where appropriate. Date format: 23/01/1994. If information is not present, leave an empty string."#;

/// The instruction strings one provider is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptSet {
    pub digits: &'static str,
    pub passport: &'static str,
    license_flat: &'static str,
    license_structured: &'static str,
}

impl PromptSet {
    pub fn for_locale(locale: PromptLocale) -> Self {
        match locale {
            PromptLocale::English => Self {
                digits: DIGITS_EN,
                passport: PASSPORT_EN,
                license_flat: LICENSE_FLAT_EN,
                license_structured: LICENSE_STRUCTURED_EN,
            },
            PromptLocale::Chinese => Self {
                digits: DIGITS_ZH,
                passport: PASSPORT_ZH,
                license_flat: LICENSE_FLAT_ZH,
                // the card keys are English either way
                license_structured: LICENSE_STRUCTURED_EN,
            },
        }
    }

    pub fn driving_license(&self, schema: LicenseSchema) -> &'static str {
        match schema {
            LicenseSchema::Flat => self.license_flat,
            LicenseSchema::Structured => self.license_structured,
        }
    }
}

/// Instruction for the text-only pass that localizes a flat record.
pub fn translation(record_json: &str, language: &str) -> String {
    format!(
        "Translate the values of name, address, class and gender in the following JSON \
         into {language}. Copy license_number, date_of_birth, issue_date and expiry_date \
         verbatim. Return only the JSON object with the same keys.\n{record_json}"
    )
}

/// English (or unspecified) targets skip the translation pass.
pub fn is_english(language: &str) -> bool {
    matches!(
        language.trim().to_ascii_lowercase().as_str(),
        "" | "en" | "eng" | "english" | "en-us" | "en-gb" | "en_us" | "en_gb"
    )
}
