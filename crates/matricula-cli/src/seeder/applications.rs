//! Fake admission applications.

use chrono::{DateTime, NaiveDate, Utc};
use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, StateName, StreetName, ZipCode};
use fake::faker::company::en::Profession;
use fake::faker::name::en::{FirstName, LastName};
use rayon::prelude::*;
use std::time::Instant;

use matricula_db::{Store, StoreResult, insert_application_with_next_number};
use matricula_models::{
    Address, AdmissionApplication, Gender, NewApplication, ParentInfo, StudentInfo,
};

const CLASSES: [&str; 12] = [
    "1st", "2nd", "3rd", "4th", "5th", "6th", "7th", "8th", "9th", "10th", "11th", "12th",
];

/// Builds `count` plausible applications in parallel.
pub fn generate_applications(count: usize, country: &str) -> Vec<NewApplication> {
    (0..count)
        .into_par_iter()
        .map(|idx| generate_application(idx, country))
        .collect()
}

fn generate_application(idx: usize, country: &str) -> NewApplication {
    let last_name: String = LastName().fake();
    let father_first: String = FirstName().fake();
    let mother_first: String = FirstName().fake();

    let gender = match (0..3).fake::<u8>() {
        0 => Gender::Male,
        1 => Gender::Female,
        _ => Gender::Other,
    };
    let date_of_birth = NaiveDate::from_ymd_opt(
        (2008..2020).fake::<i32>(),
        (1..13).fake::<u32>(),
        (1..29).fake::<u32>(),
    )
    .unwrap_or_default();
    let class_name = CLASSES[(0..CLASSES.len()).fake::<usize>()].to_string();

    let street_name: String = StreetName().fake();
    let building: String = BuildingNumber().fake();

    NewApplication {
        student_info: StudentInfo {
            first_name: FirstName().fake(),
            last_name: last_name.clone(),
            date_of_birth,
            gender,
            class_name,
            previous_school: None,
            medical_conditions: None,
        },
        parent_info: ParentInfo {
            father_name: format!("{} {}", father_first, last_name),
            mother_name: format!("{} {}", mother_first, last_name),
            email: format!(
                "{}.{}+{}@example.com",
                father_first.to_lowercase(),
                last_name.to_lowercase(),
                idx
            ),
            phone: format!("9{:09}", (0..1_000_000_000u64).fake::<u64>()),
            occupation: Some(Profession().fake()),
            address: Address {
                street: format!("{} {}", building, street_name),
                city: CityName().fake(),
                state: StateName().fake(),
                zip_code: ZipCode().fake(),
                country: country.to_string(),
            },
        },
    }
}

/// Stores generated applications one at a time so each gets the next number.
pub async fn seed_applications(
    store: &dyn Store,
    applications: &[NewApplication],
    submitted_at: DateTime<Utc>,
) -> StoreResult<Vec<AdmissionApplication>> {
    let start = Instant::now();
    let mut stored = Vec::with_capacity(applications.len());

    for application in applications {
        stored.push(insert_application_with_next_number(store, application, submitted_at).await?);
    }

    println!(
        "   Inserted {} applications in {:.2?}",
        stored.len(),
        start.elapsed()
    );
    Ok(stored)
}
