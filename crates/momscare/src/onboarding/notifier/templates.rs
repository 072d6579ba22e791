use super::{Notification, Recipient};

const BRAND: &str = "MomsCare";
const TEAL_GRADIENT: &str = "linear-gradient(135deg, #0f766e 0%, #14b8a6 100%)";
const GREEN_GRADIENT: &str = "linear-gradient(135deg, #059669 0%, #10b981 100%)";
const AUTOMATED_FOOTER: &str = "This is an automated message. Please do not reply to this email.";

/// Rendered message ready for a [`super::MailTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Addressing that does not come from the applicant record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSettings {
    pub admin_email: String,
    pub dashboard_url: String,
}

pub fn render(notification: &Notification, settings: &TemplateSettings) -> OutboundEmail {
    match notification {
        Notification::PendingVerification(recipient) => pending_verification(recipient),
        Notification::AdminNewApplication(recipient) => admin_new_application(recipient, settings),
        Notification::Approved(recipient) => approved(recipient),
    }
}

fn pending_verification(recipient: &Recipient) -> OutboundEmail {
    let role = recipient.kind.title();
    let name = escape_html(&recipient.name);

    let mut body = String::new();
    body.push_str(&heading(&format!("Dear {name},")));
    body.push_str(&paragraph(&format!(
        "Thank you for completing your {role} onboarding application with {BRAND}. We have \
         successfully received your application and all submitted documents."
    )));
    body.push_str(&callout(
        "#fef3c7",
        "#f59e0b",
        "#92400e",
        "<strong>Your application is currently under review.</strong> Our team is carefully \
         verifying your credentials and documents to ensure the highest standards of care \
         for our patients.",
    ));
    body.push_str(&paragraph(
        "Please wait while we complete the verification process. We typically review \
         applications within 3-5 business days. You will receive an email notification once \
         your account has been verified."
    ));
    body.push_str(&paragraph(
        "If you have any questions or need to update your application, please don't hesitate \
         to contact our support team."
    ));
    body.push_str(&sign_off());

    OutboundEmail {
        to: recipient.email.clone(),
        subject: "Onboarding Successful - Verification Pending".to_string(),
        html: layout("Onboarding Successful", BRAND, TEAL_GRADIENT, &body, AUTOMATED_FOOTER),
    }
}

fn admin_new_application(recipient: &Recipient, settings: &TemplateSettings) -> OutboundEmail {
    let role = recipient.kind.title();
    let name = escape_html(&recipient.name);
    let email = escape_html(&recipient.email);
    let dashboard_url = escape_html(&settings.dashboard_url);

    let mut body = String::new();
    body.push_str(&heading(&format!("New {role} Application")));
    body.push_str(&paragraph(&format!(
        "A new {} has submitted an onboarding application and is awaiting verification.",
        recipient.kind.label()
    )));
    body.push_str(&format!(
        "<div style=\"background-color: #f0f9ff; border: 1px solid #0ea5e9; padding: 20px; \
         margin: 24px 0; border-radius: 6px;\"><table role=\"presentation\" style=\"width: 100%; \
         border-collapse: collapse;\">{}{}{}</table></div>",
        detail_row("Name", &name),
        detail_row("Email", &email),
        detail_row("Type", role),
    ));
    body.push_str(&paragraph(
        "Please review the application in the admin dashboard and verify the applicant's \
         credentials and documents."
    ));
    body.push_str(&format!(
        "<div style=\"margin-top: 32px; text-align: center;\"><a href=\"{dashboard_url}\" \
         style=\"display: inline-block; padding: 12px 24px; background-color: #0f766e; color: \
         #ffffff; text-decoration: none; border-radius: 6px; font-weight: 600; font-size: \
         15px;\">Review Application</a></div>",
    ));

    OutboundEmail {
        to: settings.admin_email.clone(),
        subject: format!("New {role} Application Received - {}", recipient.name),
        html: layout(
            "New Application",
            &format!("{BRAND} Admin"),
            TEAL_GRADIENT,
            &body,
            &format!("{BRAND} Admin Notification System"),
        ),
    }
}

fn approved(recipient: &Recipient) -> OutboundEmail {
    let role = recipient.kind.title();
    let name = escape_html(&recipient.name);

    let mut body = String::new();
    body.push_str(&heading(&format!("Congratulations, {name}!")));
    body.push_str(&paragraph(&format!(
        "We are pleased to inform you that your {role} account has been successfully \
         verified and approved!"
    )));
    body.push_str(&callout(
        "#d1fae5",
        "#10b981",
        "#065f46",
        &format!(
            "<strong>Your account is now active!</strong> Patients can now request your \
             services through the {BRAND} platform."
        ),
    ));
    body.push_str(&paragraph(&format!(
        "As a verified {}, you can now:",
        recipient.kind.label()
    )));
    body.push_str(
        "<ul style=\"margin: 20px 0; padding-left: 24px; color: #4b5563; font-size: 16px; \
         line-height: 1.8;\"><li>Receive service requests from patients</li><li>Manage your \
         availability and schedule</li><li>Access your professional dashboard</li><li>Build \
         your reputation through patient reviews</li></ul>",
    );
    body.push_str(&paragraph(&format!(
        "We're excited to have you as part of the {BRAND} community. If you have any \
         questions or need assistance, our support team is here to help."
    )));
    body.push_str(&sign_off());

    OutboundEmail {
        to: recipient.email.clone(),
        subject: "Account Verified - You're Now Live!".to_string(),
        html: layout("Account Verified", BRAND, GREEN_GRADIENT, &body, AUTOMATED_FOOTER),
    }
}

fn layout(title: &str, banner: &str, gradient: &str, body: &str, footer: &str) -> String {
    format!(
        "<!DOCTYPE html>\
<html><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\
<title>{title}</title></head>\
<body style=\"margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif; background-color: #f5f5f5;\">\
<table role=\"presentation\" style=\"width: 100%; border-collapse: collapse;\"><tr><td style=\"padding: 40px 20px;\">\
<table role=\"presentation\" style=\"max-width: 600px; margin: 0 auto; background-color: #ffffff; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);\">\
<tr><td style=\"padding: 40px 40px 30px; text-align: center; background: {gradient}; border-radius: 8px 8px 0 0;\">\
<h1 style=\"margin: 0; color: #ffffff; font-size: 28px; font-weight: 600;\">{banner}</h1></td></tr>\
<tr><td style=\"padding: 40px;\">{body}</td></tr>\
<tr><td style=\"padding: 24px 40px; background-color: #f9fafb; border-radius: 0 0 8px 8px; text-align: center;\">\
<p style=\"margin: 0; color: #6b7280; font-size: 12px;\">{footer}</p></td></tr>\
</table></td></tr></table></body></html>"
    )
}

fn heading(text: &str) -> String {
    format!(
        "<h2 style=\"margin: 0 0 20px; color: #1f2937; font-size: 24px; font-weight: 600;\">{text}</h2>"
    )
}

fn paragraph(text: &str) -> String {
    format!(
        "<p style=\"margin: 20px 0; color: #4b5563; font-size: 16px; line-height: 1.6;\">{text}</p>"
    )
}

fn callout(background: &str, border: &str, color: &str, text: &str) -> String {
    format!(
        "<div style=\"background-color: {background}; border-left: 4px solid {border}; padding: \
         16px; margin: 24px 0; border-radius: 4px;\"><p style=\"margin: 0; color: {color}; \
         font-size: 15px; line-height: 1.6;\">{text}</p></div>"
    )
}

fn detail_row(label: &str, value: &str) -> String {
    format!(
        "<tr><td style=\"padding: 8px 0; color: #0c4a6e; font-size: 15px; font-weight: \
         600;\">{label}:</td><td style=\"padding: 8px 0; color: #0c4a6e; font-size: \
         15px;\">{value}</td></tr>"
    )
}

fn sign_off() -> String {
    format!(
        "<div style=\"margin-top: 32px; padding-top: 24px; border-top: 1px solid #e5e7eb;\">\
         <p style=\"margin: 0 0 8px; color: #6b7280; font-size: 14px;\">Best regards,</p>\
         <p style=\"margin: 0; color: #1f2937; font-size: 14px; font-weight: 600;\">The {BRAND} \
         Team</p></div>"
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
