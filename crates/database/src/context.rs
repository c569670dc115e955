use models::user_type::UserType;

/// Identity of the caller, passed explicitly into every mutating operation
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub operator_id: String,
    pub user_type: UserType,
    pub lab_id: Option<i32>,
    pub ip_address: Option<String>,
}

impl RequestContext {
    pub fn new(operator_id: impl Into<String>, user_type: UserType) -> Self {
        Self {
            operator_id: operator_id.into(),
            user_type,
            lab_id: None,
            ip_address: None,
        }
    }

    /// Context for maintenance tasks run outside a request, e.g. seeding
    pub fn system() -> Self {
        Self::new("system", UserType::Admin)
    }

    pub fn with_lab(mut self, lab_id: Option<i32>) -> Self {
        self.lab_id = lab_id;
        self
    }

    pub fn with_ip(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }
}
