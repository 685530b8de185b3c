use serde::{Deserialize, Serialize};

/// Service categories offered on the platform. The assistant is constrained
/// to recommend only categories from this list.
pub const SERVICE_CATEGORIES: &[&str] = &[
    "Encanador",
    "Eletricista",
    "Diarista",
    "Pintor",
    "Jardineiro",
    "Pedreiro",
    "Montador de Móveis",
    "Chaveiro",
];

pub fn now_iso() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Client,
    Professional,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Approved,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    PaymentSent,
    PaymentReceived,
    Bonus,
    Exchange,
}

/// An immutable wallet ledger entry. Amounts are optional because a single
/// entry may be denominated in TiãoCoin, in BRL, or in both (a withdrawal
/// debits TC$ and records the R$ payout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub amount_tc: Option<f64>,
    pub amount_brl: Option<f64>,
    pub description: String,
    pub timestamp: String,
    pub counterparty_id: Option<String>,
}

/// Profile fields a professional may ask to change; applied only after admin
/// approval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileChange {
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub pricing: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub nickname: Option<String>,
    pub role: UserRole,
    pub phone: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub region_id: u8,
    pub is_profile_complete: bool,
    pub status: UserStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    // Professional-only attributes
    pub services: Vec<String>,
    pub cpf_cnpj: Option<String>,
    pub bio: Option<String>,
    pub rating: Option<f64>,
    pub reviews_count: Option<u32>,
    pub pricing: Option<String>,
    pub services_change_request: Option<Vec<String>>,
    pub profile_change_request: Option<ProfileChange>,

    // Wallet
    pub balance_tc: f64,
    pub balance_brl: f64,
    pub transactions: Vec<Transaction>,

    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub id: String,
    pub email: String,
    pub name: String,
    pub nickname: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub phone: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub region_id: u8,
    pub is_profile_complete: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub services: Vec<String>,
    pub cpf_cnpj: Option<String>,
    pub bio: Option<String>,
    pub rating: Option<f64>,
    pub reviews_count: Option<u32>,
    pub pricing: Option<String>,
    pub services_change_request: Option<Vec<String>>,
    pub profile_change_request: Option<ProfileChange>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            nickname: u.nickname,
            role: u.role,
            status: u.status,
            phone: u.phone,
            street: u.street,
            neighborhood: u.neighborhood,
            city: u.city,
            state: u.state,
            region_id: u.region_id,
            is_profile_complete: u.is_profile_complete,
            latitude: u.latitude,
            longitude: u.longitude,
            services: u.services,
            cpf_cnpj: u.cpf_cnpj,
            bio: u.bio,
            rating: u.rating,
            reviews_count: u.reviews_count,
            pricing: u.pricing,
            services_change_request: u.services_change_request,
            profile_change_request: u.profile_change_request,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServicePeriod {
    #[serde(rename = "Manhã")]
    Manha,
    #[serde(rename = "Tarde")]
    Tarde,
    #[serde(rename = "Noite")]
    Noite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
    AwaitingPayment,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: String,
    pub client_id: String,
    pub professional_id: String,
    pub service: String,
    pub description: String,
    pub preferred_date: String,
    pub preferred_period: ServicePeriod,
    pub status: RequestStatus,
    pub price: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender_id: String,
    pub text: String,
    pub timestamp: String,
    pub is_ai: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionStep {
    pub step: u32,
    pub description: String,
}

/// Structured analysis returned by the AI collaborator. Produced entirely by
/// the hosted model; the server only validates shape and passes it through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiHelpResponse {
    pub is_emergency: bool,
    pub is_diy: bool,
    #[serde(default)]
    pub solution_steps: Vec<SolutionStep>,
    pub recommend_professional: bool,
    #[serde(default)]
    pub recommended_categories: Vec<String>,
    #[serde(default)]
    pub professional_reasoning: String,
    #[serde(default)]
    pub disclaimer: String,
}
