//! Messages sent by the admission workflow.
//!
//! Every value interpolated into an HTML body goes through [`escape`]: most
//! of them come straight from the public application form.

use matricula_config::SchoolConfig;
use matricula_models::{AdmissionApplication, Student};

use super::Notification;

fn escape(value: &str) -> String {
    html_escape::encode_safe(value).into_owned()
}

fn layout(school_name: &str, title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
                    <tr>
                        <td style="background-color: #1E3A8A; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 26px;">{school}</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px; color: #444444; font-size: 15px; line-height: 1.5;">
                            <h2 style="margin: 0 0 20px 0; color: #333333; font-size: 22px;">{title}</h2>
                            {content}
                        </td>
                    </tr>
                    <tr>
                        <td style="background-color: #f8f9fa; padding: 20px 30px; text-align: center; border-top: 1px solid #e9ecef;">
                            <p style="margin: 0; color: #999999; font-size: 12px;">
                                This is an automated email from {school}. Please do not reply.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#,
        title = escape(title),
        school = escape(school_name),
        content = content,
    )
}

fn row(label: &str, value: &str) -> String {
    format!("<p><strong>{}:</strong> {}</p>", escape(label), escape(value))
}

/// Alert to the admissions inbox that a new application arrived.
pub fn application_received(
    school: &SchoolConfig,
    admissions_email: &str,
    application: &AdmissionApplication,
) -> Notification {
    let student = &application.student_info;
    let parent = &application.parent_info;
    let address = &parent.address;

    let content = [
        row("Application Number", &application.application_number),
        row("Student Name", &student.full_name()),
        row("Class", &student.class_name),
        row(
            "Date of Birth",
            &student.date_of_birth.format("%d %b %Y").to_string(),
        ),
        "<h3>Parent Information</h3>".to_string(),
        row("Father", &parent.father_name),
        row("Mother", &parent.mother_name),
        row("Email", &parent.email),
        row("Phone", &parent.phone),
        "<h3>Address</h3>".to_string(),
        format!(
            "<p>{}, {}</p>",
            escape(&address.street),
            escape(&address.city)
        ),
        format!(
            "<p>{} - {}, {}</p>",
            escape(&address.state),
            escape(&address.zip_code),
            escape(&address.country)
        ),
        row(
            "Submitted on",
            &application
                .submission_date
                .format("%d %b %Y %H:%M UTC")
                .to_string(),
        ),
        "<p>Please log in to the admin portal to review this application.</p>".to_string(),
    ]
    .join("\n");

    let text_body = format!(
        "New admission application {}\n\n\
         Student: {} (class {})\n\
         Father: {}\n\
         Mother: {}\n\
         Email: {}\n\
         Phone: {}\n\n\
         Please log in to the admin portal to review this application.",
        application.application_number,
        student.full_name(),
        student.class_name,
        parent.father_name,
        parent.mother_name,
        parent.email,
        parent.phone,
    );

    Notification {
        to: admissions_email.to_string(),
        subject: format!(
            "New Admission Application - {}",
            application.application_number
        ),
        text_body,
        html_body: layout(&school.name, "New Admission Application Received", &content),
    }
}

/// Tells the parent the application was accepted and documents are due.
pub fn application_approved(
    school: &SchoolConfig,
    application: &AdmissionApplication,
) -> Notification {
    let student_name = application.student_info.full_name();
    let remarks = application.remarks.clone().unwrap_or_default();

    let content = format!(
        "<p>Dear <strong>{}</strong>,</p>\n\
         <p>We are pleased to inform you that the admission application <strong>{}</strong> \
         for <strong>{}</strong> has been approved.</p>\n\
         <p>{}</p>",
        escape(&application.parent_info.father_name),
        escape(&application.application_number),
        escape(&student_name),
        escape(&remarks)
    );

    let text_body = format!(
        "Dear {},\n\n\
         The admission application {} for {} has been approved.\n\n\
         {}\n\n\
         Regards,\n{}",
        application.parent_info.father_name,
        application.application_number,
        student_name,
        remarks,
        school.name
    );

    Notification {
        to: application.parent_info.email.clone(),
        subject: format!("Admission Approved - {}", application.application_number),
        text_body,
        html_body: layout(&school.name, "Admission Approved", &content),
    }
}

/// Confirms enrollment and hands the parent the new login identifiers.
pub fn enrollment_confirmed(
    school: &SchoolConfig,
    application: &AdmissionApplication,
    student: &Student,
) -> Notification {
    let section = student
        .academic_info
        .section
        .clone()
        .unwrap_or_else(|| "-".to_string());

    let content = [
        format!(
            "<p>Dear <strong>{}</strong>,</p>",
            escape(&application.parent_info.father_name)
        ),
        format!(
            "<p><strong>{}</strong> has been enrolled at {}.</p>",
            escape(&student.full_name()),
            escape(&school.name)
        ),
        row("Admission Number", &student.admission_number),
        row("Roll Number", &student.roll_number),
        row("Class", &student.academic_info.class_name),
        row("Section", &section),
        row("Student Login", &student.personal_info.email),
        row("Parent Login", &application.parent_info.email),
        "<p>Use the passwords provided by the school office to sign in.</p>".to_string(),
    ]
    .join("\n");

    let text_body = format!(
        "Dear {},\n\n\
         {} has been enrolled at {}.\n\n\
         Admission number: {}\n\
         Roll number: {}\n\
         Class: {} Section: {}\n\
         Student login: {}\n\
         Parent login: {}\n\n\
         Use the passwords provided by the school office to sign in.",
        application.parent_info.father_name,
        student.full_name(),
        school.name,
        student.admission_number,
        student.roll_number,
        student.academic_info.class_name,
        section,
        student.personal_info.email,
        application.parent_info.email,
    );

    Notification {
        to: application.parent_info.email.clone(),
        subject: format!("Enrollment Confirmed - Roll Number {}", student.roll_number),
        text_body,
        html_body: layout(&school.name, "Enrollment Confirmed", &content),
    }
}

pub fn application_rejected(
    school: &SchoolConfig,
    application: &AdmissionApplication,
) -> Notification {
    let student_name = application.student_info.full_name();
    let remarks = application.remarks.clone().unwrap_or_default();

    let content = format!(
        "<p>Dear <strong>{}</strong>,</p>\n\
         <p>We regret to inform you that the admission application <strong>{}</strong> \
         for <strong>{}</strong> could not be accepted.</p>\n\
         {}",
        escape(&application.parent_info.father_name),
        escape(&application.application_number),
        escape(&student_name),
        row("Remarks", &remarks)
    );

    let text_body = format!(
        "Dear {},\n\n\
         The admission application {} for {} could not be accepted.\n\n\
         Remarks: {}\n\n\
         Regards,\n{}",
        application.parent_info.father_name,
        application.application_number,
        student_name,
        remarks,
        school.name
    );

    Notification {
        to: application.parent_info.email.clone(),
        subject: format!("Admission Application Update - {}", application.application_number),
        text_body,
        html_body: layout(&school.name, "Admission Application Update", &content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use matricula_models::{
        Address, ApplicationId, ApplicationStatus, Gender, ParentInfo, StudentInfo,
    };

    fn application() -> AdmissionApplication {
        let at = Utc.with_ymd_and_hms(2026, 4, 2, 9, 30, 0).unwrap();
        AdmissionApplication {
            id: ApplicationId::new(),
            application_number: "ADM20260001".to_string(),
            student_info: StudentInfo {
                first_name: "Rahul".to_string(),
                last_name: "Sharma".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(2012, 4, 15).unwrap(),
                gender: Gender::Male,
                class_name: "9th".to_string(),
                previous_school: None,
                medical_conditions: None,
            },
            parent_info: ParentInfo {
                father_name: "Suresh Sharma".to_string(),
                mother_name: "Anita Sharma".to_string(),
                email: "suresh@example.com".to_string(),
                phone: "9876543210".to_string(),
                occupation: None,
                address: Address {
                    street: "12 MG Road".to_string(),
                    city: "Patna".to_string(),
                    state: "Bihar".to_string(),
                    zip_code: "800001".to_string(),
                    country: "India".to_string(),
                },
            },
            status: ApplicationStatus::Pending,
            submission_date: at,
            reviewed_by: None,
            review_date: None,
            remarks: None,
            assigned_roll_number: None,
            assigned_class: None,
            assigned_section: None,
            admission_date: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_staff_alert_goes_to_admissions_inbox() {
        let school = SchoolConfig::default();
        let n = application_received(&school, "office@nalandaschool.edu", &application());
        assert_eq!(n.to, "office@nalandaschool.edu");
        assert_eq!(n.subject, "New Admission Application - ADM20260001");
        assert!(n.html_body.contains("Rahul Sharma"));
        assert!(n.text_body.contains("9876543210"));
    }

    #[test]
    fn test_form_values_are_escaped_in_html() {
        let mut app = application();
        app.student_info.first_name =
            r#"<a href="http://evil.example">Click to review</a>"#.to_string();
        app.parent_info.address.city = "<script>alert(1)</script>".to_string();
        app.remarks = Some("<b>bold</b>".to_string());

        let school = SchoolConfig::default();
        for n in [
            application_received(&school, "office@nalandaschool.edu", &app),
            application_approved(&school, &app),
            application_rejected(&school, &app),
        ] {
            assert!(!n.html_body.contains("<a href"), "{}", n.subject);
            assert!(!n.html_body.contains("<script>"), "{}", n.subject);
            assert!(!n.html_body.contains("<b>bold"), "{}", n.subject);
        }

        let received = application_received(&school, "office@nalandaschool.edu", &app);
        assert!(received.html_body.contains("&lt;a href="));
        assert!(received.text_body.contains(r#"<a href="http://evil.example">"#));
    }

    #[test]
    fn test_rejection_includes_remarks() {
        let mut app = application();
        app.remarks = Some("Class is full".to_string());
        let n = application_rejected(&SchoolConfig::default(), &app);
        assert_eq!(n.to, "suresh@example.com");
        assert!(n.text_body.contains("Class is full"));
    }
}
