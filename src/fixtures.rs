//! In-code seed data for the initial services and doctors catalog.
//!
//! Loaded by the `seed` binary with create-or-update semantics keyed on the
//! natural name field, so re-running the loader never duplicates records.

use std::collections::BTreeMap;

use crate::models::{DAY_OFF, WEEKDAYS};

pub struct ServiceFixture {
    pub name: &'static str,
    pub description: &'static str,
    /// Decimal literal, parsed at load time.
    pub price: &'static str,
    pub duration_min: i32,
}

pub struct DoctorFixture {
    pub name: &'static str,
    pub specialty: &'static str,
    pub experience_years: i32,
    pub education: &'static str,
    pub description: &'static str,
    pub service_names: &'static [&'static str],
}

pub const SERVICES: &[ServiceFixture] = &[
    ServiceFixture {
        name: "Initial consultation",
        description: "Examination, diagnosis and a personal treatment plan.",
        price: "500.00",
        duration_min: 30,
    },
    ServiceFixture {
        name: "Professional cleaning",
        description: "Ultrasonic scaling and polishing of all teeth.",
        price: "2500.00",
        duration_min: 60,
    },
    ServiceFixture {
        name: "Composite filling",
        description: "Treatment of caries with a light-cured composite filling.",
        price: "3500.00",
        duration_min: 60,
    },
    ServiceFixture {
        name: "Root canal treatment",
        description: "Endodontic treatment of a single-root canal under anesthesia.",
        price: "7000.00",
        duration_min: 90,
    },
    ServiceFixture {
        name: "Tooth extraction",
        description: "Simple extraction under local anesthesia.",
        price: "3000.00",
        duration_min: 30,
    },
    ServiceFixture {
        name: "Teeth whitening",
        description: "In-office whitening, full arch.",
        price: "12000.00",
        duration_min: 90,
    },
    ServiceFixture {
        name: "Dental implant placement",
        description: "Placement of a single implant, crown not included.",
        price: "35000.00",
        duration_min: 120,
    },
    ServiceFixture {
        name: "Orthodontic consultation",
        description: "Bite assessment and braces treatment planning.",
        price: "1000.00",
        duration_min: 45,
    },
];

pub const DOCTORS: &[DoctorFixture] = &[
    DoctorFixture {
        name: "Elena Smirnova",
        specialty: "Therapist",
        experience_years: 12,
        education: "First Moscow State Medical University, dentistry, 2011.",
        description: "Specializes in caries treatment and endodontics.",
        service_names: &[
            "Initial consultation",
            "Professional cleaning",
            "Composite filling",
            "Root canal treatment",
        ],
    },
    DoctorFixture {
        name: "Igor Volkov",
        specialty: "Surgeon",
        experience_years: 18,
        education: "Kazan State Medical University, dental surgery, 2005.",
        description: "Extractions and implant placement of any complexity.",
        service_names: &[
            "Initial consultation",
            "Tooth extraction",
            "Dental implant placement",
        ],
    },
    DoctorFixture {
        name: "Maria Kuznetsova",
        specialty: "Hygienist",
        experience_years: 7,
        education: "Saint Petersburg Medical College, dental hygiene, 2017.",
        description: "Preventive care, cleaning and whitening.",
        service_names: &[
            "Professional cleaning",
            "Teeth whitening",
        ],
    },
    DoctorFixture {
        name: "Dmitry Orlov",
        specialty: "Orthodontist",
        experience_years: 10,
        education: "Moscow State University of Medicine and Dentistry, orthodontics, 2013.",
        description: "Braces and aligner treatment for adults and teenagers.",
        service_names: &[
            "Initial consultation",
            "Orthodontic consultation",
        ],
    },
];

/// Default schedule assigned to seeded doctors: weekdays 09:00-18:00,
/// Saturday short day, Sunday off.
pub fn default_working_hours() -> BTreeMap<String, String> {
    let mut hours = BTreeMap::new();
    for day in &WEEKDAYS[..5] {
        hours.insert(day.to_string(), "09:00-18:00".to_string());
    }
    hours.insert("saturday".to_string(), "10:00-16:00".to_string());
    hours.insert("sunday".to_string(), DAY_OFF.to_string());
    hours
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validate_working_hours;
    use rust_decimal::Decimal;
    use std::collections::BTreeSet;
    use std::str::FromStr;

    #[test]
    fn service_prices_are_positive_decimals() {
        for svc in SERVICES {
            let price = Decimal::from_str(svc.price).expect("price must parse");
            assert!(price > Decimal::ZERO, "{} has non-positive price", svc.name);
        }
    }

    #[test]
    fn fixture_names_are_unique() {
        let services: BTreeSet<_> = SERVICES.iter().map(|s| s.name).collect();
        assert_eq!(services.len(), SERVICES.len());
        let doctors: BTreeSet<_> = DOCTORS.iter().map(|d| d.name).collect();
        assert_eq!(doctors.len(), DOCTORS.len());
    }

    #[test]
    fn doctor_service_references_resolve() {
        let services: BTreeSet<_> = SERVICES.iter().map(|s| s.name).collect();
        for doc in DOCTORS {
            for name in doc.service_names {
                assert!(services.contains(name), "{} references unknown service {name}", doc.name);
            }
        }
    }

    #[test]
    fn default_schedule_covers_the_week() {
        let hours = default_working_hours();
        assert!(validate_working_hours(&hours).is_ok());
        assert_eq!(hours["sunday"], DAY_OFF);
    }
}
