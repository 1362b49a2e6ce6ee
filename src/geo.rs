//! UAE emirates and their deliverable cities.
//!
//! The city list is keyed by emirate: the shipping form only accepts a city
//! that belongs to the selected emirate, and changing the emirate resets the
//! city selection.

pub struct Emirate {
    pub name: &'static str,
    pub name_ar: &'static str,
    pub cities: &'static [&'static str],
}

pub static EMIRATES: &[Emirate] = &[
    Emirate {
        name: "Dubai",
        name_ar: "دبي",
        cities: &["Dubai", "Jebel Ali", "Hatta"],
    },
    Emirate {
        name: "Abu Dhabi",
        name_ar: "أبوظبي",
        cities: &["Abu Dhabi", "Al Ain", "Madinat Zayed", "Ruwais"],
    },
    Emirate {
        name: "Sharjah",
        name_ar: "الشارقة",
        cities: &["Sharjah", "Khor Fakkan", "Kalba", "Dibba Al-Hisn"],
    },
    Emirate {
        name: "Ajman",
        name_ar: "عجمان",
        cities: &["Ajman", "Masfout", "Manama"],
    },
    Emirate {
        name: "Umm Al Quwain",
        name_ar: "أم القيوين",
        cities: &["Umm Al Quwain", "Falaj Al Mualla"],
    },
    Emirate {
        name: "Ras Al Khaimah",
        name_ar: "رأس الخيمة",
        cities: &["Ras Al Khaimah", "Al Rams", "Khatt"],
    },
    Emirate {
        name: "Fujairah",
        name_ar: "الفجيرة",
        cities: &["Fujairah", "Dibba Al-Fujairah", "Masafi"],
    },
];

pub fn find_emirate(name: &str) -> Option<&'static Emirate> {
    EMIRATES.iter().find(|e| e.name.eq_ignore_ascii_case(name) || e.name_ar == name)
}

pub fn cities_of(emirate: &str) -> &'static [&'static str] {
    find_emirate(emirate).map(|e| e.cities).unwrap_or(&[])
}

/// True when `city` is deliverable within `emirate`.
pub fn city_in_emirate(emirate: &str, city: &str) -> bool {
    cities_of(emirate).iter().any(|c| c.eq_ignore_ascii_case(city))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_emirate() {
        assert!(find_emirate("Dubai").is_some());
        assert!(find_emirate("dubai").is_some());
        assert!(find_emirate("دبي").is_some());
        assert!(find_emirate("Riyadh").is_none());
    }

    #[test]
    fn test_city_consistency() {
        assert!(city_in_emirate("Abu Dhabi", "Al Ain"));
        assert!(city_in_emirate("Sharjah", "khor fakkan"));
        // A real city, but in the wrong emirate.
        assert!(!city_in_emirate("Dubai", "Al Ain"));
        assert!(!city_in_emirate("Nowhere", "Dubai"));
    }

    #[test]
    fn test_every_emirate_has_cities() {
        for e in EMIRATES {
            assert!(!e.cities.is_empty(), "{} has no cities", e.name);
        }
    }
}
