pub fn password_reset_subject(site_name: &str) -> String {
    format!("{site_name} Password Reset")
}

pub fn render_password_reset(reset_url: &str, valid_minutes: i64) -> String {
    format!(
        "You are receiving this because you (or someone else) have requested the reset of the \
password for your account.\n\n\
Please click on the following link, or paste this into your browser to complete the process:\n\n\
{reset_url}\n\n\
This link expires in {valid_minutes} minutes.\n\n\
If you did not request this, please ignore this email and your password will remain unchanged.\n"
    )
}

pub fn password_changed_subject() -> String {
    "Your password has been changed".to_string()
}

pub fn render_password_changed(username: &str) -> String {
    format!(
        "Hello,\n\n\
This is a confirmation that the password for your account {username} has just been changed.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_body_carries_link_and_lifetime() {
        let body = render_password_reset("http://localhost:5000/reset/abc123", 10);
        assert!(body.contains("http://localhost:5000/reset/abc123\n"));
        assert!(body.contains("expires in 10 minutes"));
    }
}
