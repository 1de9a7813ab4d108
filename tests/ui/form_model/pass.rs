use sitekit::form::{FieldLens, FormModel};

#[derive(Clone, sitekit::form::FormModel)]
struct NewsletterForm {
    email: String,
}

fn main() {
    let fields = NewsletterForm::fields();
    let lens = fields.email();
    let mut model = NewsletterForm {
        email: "a@example.com".to_string(),
    };
    lens.set(&mut model, "b@example.com".to_string());
    assert_eq!(lens.key().as_str(), "email");
    assert_eq!(lens.get(&model), "b@example.com");
    assert_eq!(NewsletterForm::FIELD_KEYS.len(), 1);
}
