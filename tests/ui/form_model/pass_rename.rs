use sitekit::form::{FieldLens, FormModel};

#[derive(Clone, sitekit::form::FormModel)]
struct QuoteRequest {
    #[form(rename = "company-name")]
    company: String,
    budget_range: String,
}

fn main() {
    let fields = QuoteRequest::fields();
    assert_eq!(fields.company().key().as_str(), "company-name");
    assert_eq!(fields.budget_range().key().as_str(), "budget_range");
    let _lens: QuoteRequestBudgetRangeLens = fields.budget_range();
    assert_eq!(
        QuoteRequest::FIELD_KEYS
            .iter()
            .map(|key| key.as_str())
            .collect::<Vec<_>>(),
        ["company-name", "budget_range"]
    );
}
