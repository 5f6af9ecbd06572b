//! Fixed ordered steps of the business form
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    BasicInfo,
    CategoryAndAttributes,
    ContactAndLocation,
    HoursAndSocial,
    AdditionalInfo,
}

const STEPS: [FormStep; 5] = [
    FormStep::BasicInfo,
    FormStep::CategoryAndAttributes,
    FormStep::ContactAndLocation,
    FormStep::HoursAndSocial,
    FormStep::AdditionalInfo,
];

impl FormStep {
    pub fn all() -> &'static [FormStep] {
        &STEPS
    }

    pub fn first() -> FormStep {
        FormStep::BasicInfo
    }

    pub fn last() -> FormStep {
        FormStep::AdditionalInfo
    }

    pub fn index(&self) -> usize {
        match *self {
            FormStep::BasicInfo => 0,
            FormStep::CategoryAndAttributes => 1,
            FormStep::ContactAndLocation => 2,
            FormStep::HoursAndSocial => 3,
            FormStep::AdditionalInfo => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<FormStep> {
        STEPS.get(index).cloned()
    }

    pub fn next(&self) -> Option<FormStep> {
        FormStep::from_index(self.index() + 1)
    }

    pub fn previous(&self) -> Option<FormStep> {
        match self.index() {
            0 => None,
            index => FormStep::from_index(index - 1),
        }
    }

    pub fn is_last(&self) -> bool {
        *self == FormStep::last()
    }

    pub fn title(&self) -> &'static str {
        match *self {
            FormStep::BasicInfo => "Basic information",
            FormStep::CategoryAndAttributes => "Category & details",
            FormStep::ContactAndLocation => "Contact & location",
            FormStep::HoursAndSocial => "Hours & social media",
            FormStep::AdditionalInfo => "Additional information",
        }
    }

    /// Business fields edited on this step, category attributes aside
    pub fn fields(&self) -> &'static [&'static str] {
        match *self {
            FormStep::BasicInfo => &["name", "description", "price_range"],
            FormStep::CategoryAndAttributes => &["category_id", "subcategory_id"],
            FormStep::ContactAndLocation => &["address", "city", "state", "zip_code", "phone", "email", "website"],
            FormStep::HoursAndSocial => &["hours", "social_media"],
            FormStep::AdditionalInfo => &["images", "additional_info"],
        }
    }

    pub fn has_attributes(&self) -> bool {
        *self == FormStep::CategoryAndAttributes
    }

    /// Step where `field` is edited
    pub fn of_field(field: &str) -> Option<FormStep> {
        STEPS.iter().cloned().find(|step| step.fields().contains(&field))
    }
}

impl Default for FormStep {
    fn default() -> Self {
        FormStep::first()
    }
}

impl fmt::Display for FormStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}
