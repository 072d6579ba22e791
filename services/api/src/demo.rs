use crate::infra::{InMemoryApplicantRepository, InMemoryObjectStorage, LoggingMailTransport};
use clap::Args;
use momscare::error::AppError;
use momscare::onboarding::{
    ApplicantKind, ApplicationStatus, Availability, DocumentRef, DoctorSubmission,
    NurseSubmission, ObjectStorage, OnboardingApi, QueuedNotifier, StaticTokenAuthorizer,
    TemplateSettings,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Base URL used for generated upload and document links
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    pub(crate) base_url: String,
    /// Admin inbox that receives new-application alerts
    #[arg(long, default_value = "ops@momscare.in")]
    pub(crate) admin_email: String,
    /// Reject the doctor instead of leaving the application pending
    #[arg(long)]
    pub(crate) reject_doctor: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        base_url,
        admin_email,
        reject_doctor,
    } = args;

    let storage = Arc::new(InMemoryObjectStorage::new(base_url.clone()));
    let transport = LoggingMailTransport::default();
    let notifier = Arc::new(QueuedNotifier::spawn(
        Arc::new(transport.clone()),
        TemplateSettings {
            admin_email,
            dashboard_url: format!("{}/admin", base_url.trim_end_matches('/')),
        },
    ));
    let api = OnboardingApi::new(
        Arc::new(InMemoryApplicantRepository::default()),
        storage.clone(),
        notifier.clone(),
        Arc::new(StaticTokenAuthorizer::new("demo")),
    );

    println!("MomsCare onboarding demo");

    let nurse_document = upload(storage.as_ref(), "nursing council certificate")?;
    let doctor_document = upload(storage.as_ref(), "medical council registration")?;

    let nurse_id = match api.onboarding.submit_nurse(demo_nurse(nurse_document)) {
        Ok(id) => {
            println!("  Nurse application recorded: {id}");
            Some(id)
        }
        Err(err) => {
            println!("  Nurse application rejected: {err}");
            None
        }
    };

    let doctor_id = match api.onboarding.submit_doctor(demo_doctor(doctor_document)) {
        Ok(id) => {
            println!("  Doctor application recorded: {id}");
            Some(id)
        }
        Err(err) => {
            println!("  Doctor application rejected: {err}");
            None
        }
    };

    let mut incomplete = demo_doctor(DocumentRef::default());
    incomplete.email = "incomplete@example.in".to_string();
    incomplete.license_no.clear();
    if let Err(err) = api.onboarding.submit_doctor(incomplete) {
        println!("  Incomplete doctor form rejected: {err}");
    }

    if let Some(id) = &nurse_id {
        match api
            .onboarding
            .update_status(ApplicantKind::Nurse, id, ApplicationStatus::Approved)
        {
            Ok(()) => println!("  Nurse {id} approved"),
            Err(err) => println!("  Nurse approval failed: {err}"),
        }
    }
    if let (Some(id), true) = (&doctor_id, reject_doctor) {
        match api
            .onboarding
            .update_status(ApplicantKind::Doctor, id, ApplicationStatus::Rejected)
        {
            Ok(()) => println!("  Doctor {id} rejected"),
            Err(err) => println!("  Doctor rejection failed: {err}"),
        }
    }

    println!("\nReview dashboard");
    match api.review.list_applicants() {
        Ok(applicants) => {
            for applicant in applicants {
                println!(
                    "  {:<7} {:<22} {:<28} {}",
                    applicant.kind.label(),
                    applicant.name,
                    applicant.email,
                    applicant.status.label()
                );
            }
        }
        Err(err) => println!("  Listing unavailable: {err}"),
    }

    if let Some(id) = &doctor_id {
        if let Ok(record) = api.review.applicant_detail(ApplicantKind::Doctor, id) {
            match api.review.resolve_document_url(record.profile.document_id()) {
                Ok(Some(url)) => println!("  Doctor credential: {url}"),
                Ok(None) => println!("  Doctor credential: unavailable"),
                Err(err) => println!("  Doctor credential lookup failed: {err}"),
            }
        }
    }

    notifier.shutdown().await;

    println!("\nEmails sent");
    for email in transport.sent() {
        println!("  to {:<28} {}", email.to, email.subject);
    }

    Ok(())
}

fn upload<S: ObjectStorage>(storage: &S, label: &str) -> Result<DocumentRef, AppError> {
    let ticket = storage.issue_upload()?;
    let body = format!("%PDF-1.7 {label}").into_bytes();
    let document = storage.complete_upload(&ticket.ticket, "application/pdf", body)?;
    println!("  Uploaded {label}: {document}");
    Ok(document)
}

fn demo_nurse(document: DocumentRef) -> NurseSubmission {
    NurseSubmission {
        name: "Priya Nair".to_string(),
        contact_number: "9845012345".to_string(),
        email: "priya.nair@example.in".to_string(),
        gender: "female".to_string(),
        nursing_qualification: "B.Sc Nursing".to_string(),
        nursing_category: "Postnatal care".to_string(),
        service_areas: vec!["HSR Layout".to_string(), "Koramangala".to_string()],
        license_no: "KNC-20931".to_string(),
        document_id: document,
        specific_skills: "Newborn care, breastfeeding support".to_string(),
        transport_mode: "Two-wheeler".to_string(),
        languages_known: vec!["English".to_string(), "Malayalam".to_string()],
    }
}

fn demo_doctor(document: DocumentRef) -> DoctorSubmission {
    DoctorSubmission {
        name: "Dr. Rohan Kulkarni".to_string(),
        contact_number: "7022001122".to_string(),
        email: "rohan.kulkarni@example.in".to_string(),
        medical_qualification: "MBBS, MS (OBG)".to_string(),
        specialization: "Obstetrics & Gynaecology".to_string(),
        service_areas: vec!["Jayanagar".to_string()],
        license_no: "KMC-61044".to_string(),
        document_id: document,
        experience: Some(9.0),
        clinical_experience: "High-risk pregnancy care".to_string(),
        availability: Availability {
            days: Vec::new(),
            time_ranges: None,
            is_247: true,
        },
    }
}
