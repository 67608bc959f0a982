use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// The fixed set of classes the school schedules every day.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, EnumIter)]
pub enum SchoolClass {
    Class1,
    Class2,
    Class3,
    Class4,
    Class5,
    Class6,
    Class7,
    Class8,
    Class9,
    Class10,
    EleventhScience,
    EleventhCommerce,
    TwelfthScience,
    TwelfthCommerce,
}

impl SchoolClass {
    /// Short form used by registration forms.
    pub fn id(self) -> &'static str {
        match self {
            SchoolClass::Class1 => "1",
            SchoolClass::Class2 => "2",
            SchoolClass::Class3 => "3",
            SchoolClass::Class4 => "4",
            SchoolClass::Class5 => "5",
            SchoolClass::Class6 => "6",
            SchoolClass::Class7 => "7",
            SchoolClass::Class8 => "8",
            SchoolClass::Class9 => "9",
            SchoolClass::Class10 => "10",
            SchoolClass::EleventhScience => "11-science",
            SchoolClass::EleventhCommerce => "11-commerce",
            SchoolClass::TwelfthScience => "12-science",
            SchoolClass::TwelfthCommerce => "12-commerce",
        }
    }

    /// Display label, also the key used in timetables.
    pub fn label(self) -> &'static str {
        match self {
            SchoolClass::Class1 => "Class 1",
            SchoolClass::Class2 => "Class 2",
            SchoolClass::Class3 => "Class 3",
            SchoolClass::Class4 => "Class 4",
            SchoolClass::Class5 => "Class 5",
            SchoolClass::Class6 => "Class 6",
            SchoolClass::Class7 => "Class 7",
            SchoolClass::Class8 => "Class 8",
            SchoolClass::Class9 => "Class 9",
            SchoolClass::Class10 => "Class 10",
            SchoolClass::EleventhScience => "11th Science",
            SchoolClass::EleventhCommerce => "11th Commerce",
            SchoolClass::TwelfthScience => "12th Science",
            SchoolClass::TwelfthCommerce => "12th Commerce",
        }
    }

    /// Accepts either the short id (`"11-science"`) or the label (`"11th Science"`).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        SchoolClass::iter()
            .find(|c| c.id().eq_ignore_ascii_case(value) || c.label().eq_ignore_ascii_case(value))
    }

    /// Classes 9 and above get core subjects in the remedial slots.
    pub fn is_senior(self) -> bool {
        matches!(
            self,
            SchoolClass::Class9
                | SchoolClass::Class10
                | SchoolClass::EleventhScience
                | SchoolClass::EleventhCommerce
                | SchoolClass::TwelfthScience
                | SchoolClass::TwelfthCommerce
        )
    }

    pub fn all_labels() -> Vec<String> {
        SchoolClass::iter().map(|c| c.label().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_and_labels() {
        assert_eq!(SchoolClass::parse("9"), Some(SchoolClass::Class9));
        assert_eq!(SchoolClass::parse("Class 9"), Some(SchoolClass::Class9));
        assert_eq!(SchoolClass::parse("12-commerce"), Some(SchoolClass::TwelfthCommerce));
        assert_eq!(SchoolClass::parse(" 11th science "), Some(SchoolClass::EleventhScience));
        assert_eq!(SchoolClass::parse("Class 13"), None);
    }

    #[test]
    fn fourteen_classes_in_order() {
        let labels = SchoolClass::all_labels();
        assert_eq!(labels.len(), 14);
        assert_eq!(labels.first().map(String::as_str), Some("Class 1"));
        assert_eq!(labels.last().map(String::as_str), Some("12th Commerce"));
    }

    #[test]
    fn seniority_starts_at_class_nine() {
        assert!(!SchoolClass::Class8.is_senior());
        assert!(SchoolClass::Class9.is_senior());
        assert!(SchoolClass::TwelfthScience.is_senior());
    }
}
