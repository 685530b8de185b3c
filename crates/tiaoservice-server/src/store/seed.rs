//! Mock marketplace fixtures. The platform ships with a handful of users so
//! every flow (login, search, recommendation, wallet, admin approval) can be
//! exercised without a signup step.

use uuid::Uuid;

use super::Store;
use crate::auth::password;
use crate::error::AppResult;
use crate::models::{
    now_iso, RequestStatus, ServicePeriod, ServiceRequest, User, UserRole, UserStatus,
};

const SEED_PASSWORD: &str = "senha123";

struct Pro<'a> {
    name: &'a str,
    email: &'a str,
    services: &'a [&'a str],
    rating: f64,
    reviews: u32,
    pricing: Option<&'a str>,
    coords: Option<(f64, f64)>,
    status: UserStatus,
    balance_tc: f64,
}

pub fn populate(store: &Store) -> AppResult<()> {
    let password_hash = password::hash_password(SEED_PASSWORD)?;

    let admin = base_user(
        "Tião Admin",
        "admin@tiaoservice.com.br",
        UserRole::Admin,
        &password_hash,
    );
    store.insert_user(admin)?;

    let mut maria = base_user(
        "Maria Souza",
        "maria@example.com",
        UserRole::Client,
        &password_hash,
    );
    maria.balance_tc = 150.0;
    maria.balance_brl = 50.0;
    maria.latitude = Some(-23.5505);
    maria.longitude = Some(-46.6333);
    let maria_id = maria.id.clone();
    store.insert_user(maria)?;

    let mut joao = base_user(
        "João Pereira",
        "joao@example.com",
        UserRole::Client,
        &password_hash,
    );
    joao.balance_tc = 20.0;
    store.insert_user(joao)?;

    let pros = [
        Pro {
            name: "Carlos Silva",
            email: "carlos@example.com",
            services: &["Encanador"],
            rating: 4.8,
            reviews: 32,
            pricing: Some("A partir de R$ 80"),
            coords: Some((-23.5614, -46.6553)),
            status: UserStatus::Approved,
            balance_tc: 340.0,
        },
        Pro {
            name: "Antônio Ferreira",
            email: "antonio@example.com",
            services: &["Eletricista"],
            rating: 4.5,
            reviews: 18,
            pricing: Some("Visita a partir de R$ 120"),
            coords: Some((-23.5329, -46.6395)),
            status: UserStatus::Approved,
            balance_tc: 95.0,
        },
        Pro {
            name: "Francisca Lima",
            email: "francisca@example.com",
            services: &["Diarista"],
            rating: 5.0,
            reviews: 51,
            pricing: Some("Diária R$ 150"),
            coords: Some((-23.5587, -46.6250)),
            status: UserStatus::Approved,
            balance_tc: 210.0,
        },
        Pro {
            name: "Pedro Santos",
            email: "pedro@example.com",
            services: &["Pintor", "Pedreiro"],
            rating: 4.2,
            reviews: 9,
            pricing: Some("Orçamento sob consulta"),
            coords: None,
            status: UserStatus::Approved,
            balance_tc: 0.0,
        },
        Pro {
            name: "Roberto Alves",
            email: "roberto@example.com",
            services: &["Encanador", "Eletricista"],
            rating: 4.9,
            reviews: 44,
            pricing: Some("A partir de R$ 60"),
            coords: Some((-23.5744, -46.6412)),
            status: UserStatus::Approved,
            balance_tc: 520.0,
        },
        Pro {
            name: "José Oliveira",
            email: "jose@example.com",
            services: &["Pedreiro"],
            rating: 5.0,
            reviews: 1,
            pricing: None,
            coords: None,
            status: UserStatus::Pending,
            balance_tc: 0.0,
        },
    ];

    let mut first_pro_id = None;
    for p in pros {
        let mut user = base_user(p.name, p.email, UserRole::Professional, &password_hash);
        user.status = p.status;
        user.services = p.services.iter().map(|s| s.to_string()).collect();
        user.rating = Some(p.rating);
        user.reviews_count = Some(p.reviews);
        user.pricing = p.pricing.map(|s| s.to_string());
        user.bio = Some(format!("{} com experiência na região.", p.services[0]));
        if let Some((lat, lon)) = p.coords {
            user.latitude = Some(lat);
            user.longitude = Some(lon);
        }
        user.balance_tc = p.balance_tc;
        if first_pro_id.is_none() {
            first_pro_id = Some(user.id.clone());
        }
        store.insert_user(user)?;
    }

    if let Some(professional_id) = first_pro_id {
        store.insert_request(ServiceRequest {
            id: Uuid::new_v4().to_string(),
            client_id: maria_id,
            professional_id,
            service: "Encanador".to_string(),
            description: "Pia da cozinha entupida, a água não desce.".to_string(),
            preferred_date: "2025-08-20".to_string(),
            preferred_period: ServicePeriod::Manha,
            status: RequestStatus::Pending,
            price: 120.0,
            created_at: now_iso(),
        })?;
    }

    Ok(())
}

fn base_user(name: &str, email: &str, role: UserRole, password_hash: &str) -> User {
    let now = now_iso();
    User {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        name: name.to_string(),
        nickname: None,
        role,
        phone: "(11) 99999-0000".to_string(),
        street: "Rua das Flores, 100".to_string(),
        neighborhood: "Centro".to_string(),
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
        region_id: 1,
        is_profile_complete: true,
        status: UserStatus::Approved,
        latitude: None,
        longitude: None,
        services: Vec::new(),
        cpf_cnpj: None,
        bio: None,
        rating: None,
        reviews_count: None,
        pricing: None,
        services_change_request: None,
        profile_change_request: None,
        balance_tc: 0.0,
        balance_brl: 0.0,
        transactions: Vec::new(),
        created_at: now.clone(),
        updated_at: now,
    }
}
