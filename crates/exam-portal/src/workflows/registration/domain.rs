use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for allocated registrations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationNumber(pub String);

impl std::fmt::Display for ApplicationNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Candidate affiliation category gating which district list applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Union {
    Harit,
    Tirhut,
}

impl Union {
    pub const fn label(self) -> &'static str {
        match self {
            Union::Harit => "Harit Union",
            Union::Tirhut => "Tirhut Union",
        }
    }

    /// Districts a candidate under this union may list as preferences.
    pub const fn district_options(self) -> &'static [District] {
        match self {
            Union::Harit => &[
                District::Patna,
                District::Nalanda,
                District::Buxar,
                District::Bhojpur,
            ],
            Union::Tirhut => &[
                District::Vaishali,
                District::Samastipur,
                District::Begusarai,
                District::Muzaffarpur,
            ],
        }
    }
}

/// District preference options across both unions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum District {
    Patna,
    Nalanda,
    Buxar,
    Bhojpur,
    Vaishali,
    Samastipur,
    Begusarai,
    Muzaffarpur,
}

impl District {
    pub const fn label(self) -> &'static str {
        match self {
            District::Patna => "Patna",
            District::Nalanda => "Nalanda",
            District::Buxar => "Buxar",
            District::Bhojpur => "Bhojpur",
            District::Vaishali => "Vaishali",
            District::Samastipur => "Samastipur",
            District::Begusarai => "Begusarai",
            District::Muzaffarpur => "Muzaffarpur",
        }
    }

    pub fn valid_for(self, union: Union) -> bool {
        union.district_options().contains(&self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

/// Advertised posts a candidate may apply for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Post {
    StateManagerSalesMarketing,
    DistrictManagerAgriBusiness,
    DistrictManagerSalesMarketing,
    DistrictManagerFinanceAccountant,
    AssistantManager,
    Supervisor,
    SupportStaff,
    DataEntryOperator,
    OfficeBoy,
}

impl Post {
    pub const fn label(self) -> &'static str {
        match self {
            Post::StateManagerSalesMarketing => "State Manager (Sales and Marketing)",
            Post::DistrictManagerAgriBusiness => "District Manager (Agri Business Management)",
            Post::DistrictManagerSalesMarketing => "District Manager (Sales and Marketing)",
            Post::DistrictManagerFinanceAccountant => "District Manager (Finance and Accountant)",
            Post::AssistantManager => "Assistant Manager",
            Post::Supervisor => "Supervisor",
            Post::SupportStaff => "Support Staff",
            Post::DataEntryOperator => "Data Entry Operator",
            Post::OfficeBoy => "Office Boy",
        }
    }
}

/// Which variant of the registration form the candidate filled in. The
/// extended variant additionally requires a CV and work/qualification
/// certificates at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormVariant {
    #[default]
    Standard,
    Extended,
}

/// Personal-information section collected by the registration step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub union: Union,
    pub name: String,
    pub father_name: String,
    pub mother_name: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub email: String,
    pub mobile: String,
    pub address: String,
    pub aadhaar_number: String,
    pub selected_posts: Vec<Post>,
    pub district_preferences: Vec<District>,
}

/// Exam center and shift assigned once by the allocation policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamAllocation {
    pub center: String,
    pub shift: String,
}
