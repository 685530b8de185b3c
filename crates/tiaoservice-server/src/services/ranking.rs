//! Professional recommendation ranking. Given the categories the assistant
//! recommended and the approved professionals, pick up to three to display,
//! each tagged with the reason it was chosen. A professional is removed from
//! the candidate pool once picked, so the three slots never repeat.

use serde::Serialize;

use crate::models::{User, UserPublic};

/// Price rank for professionals whose pricing text has no parsable value;
/// sorts after every real price.
const UNPRICED: i64 = 99999;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub accent: &'static str,
}

pub const TOP_RATED: Badge = Badge {
    label: "Melhor Avaliado",
    accent: "#f97316",
};
pub const BEST_PRICE: Badge = Badge {
    label: "Melhor Preço",
    accent: "#22c55e",
};
pub const NEAREST: Badge = Badge {
    label: "Mais Próximo",
    accent: "#3b82f6",
};
pub const RECOMMENDED: Badge = Badge {
    label: "Recomendado",
    accent: "#a855f7",
};

#[derive(Debug, Clone, Copy)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct Recommendation {
    pub professional: UserPublic,
    pub badge: Badge,
}

/// Select up to three professionals for the recommended categories.
///
/// Slot order: best rated, best price, then nearest when the caller's
/// location is known, otherwise the next best rated badged plainly as
/// "Recomendado". Ties (equal rating, equal price) keep the earliest
/// professional in input order.
pub fn recommend(
    professionals: &[User],
    categories: &[String],
    caller: Option<Coordinates>,
) -> Vec<Recommendation> {
    let mut pool: Vec<&User> = professionals
        .iter()
        .filter(|p| p.services.iter().any(|s| categories.contains(s)))
        .collect();

    let mut picks = Vec::new();

    if let Some(best) = take_best_rated(&mut pool) {
        picks.push(Recommendation {
            professional: best.clone().into(),
            badge: TOP_RATED,
        });
    }

    if let Some(cheapest) = take_best_price(&mut pool) {
        picks.push(Recommendation {
            professional: cheapest.clone().into(),
            badge: BEST_PRICE,
        });
    }

    match caller.and_then(|c| take_nearest(&mut pool, c)) {
        Some(nearest) => picks.push(Recommendation {
            professional: nearest.clone().into(),
            badge: NEAREST,
        }),
        None => {
            if let Some(fallback) = take_best_rated(&mut pool) {
                picks.push(Recommendation {
                    professional: fallback.clone().into(),
                    badge: RECOMMENDED,
                });
            }
        }
    }

    picks
}

fn take_best_rated<'a>(pool: &mut Vec<&'a User>) -> Option<&'a User> {
    let index = pool
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| {
            let ra = a.rating.unwrap_or(0.0);
            let rb = b.rating.unwrap_or(0.0);
            ra.partial_cmp(&rb)
                .unwrap_or(std::cmp::Ordering::Equal)
                // max_by keeps the later element on ties; prefer input order
                .then(ib.cmp(ia))
        })
        .map(|(i, _)| i)?;
    Some(pool.remove(index))
}

fn take_best_price<'a>(pool: &mut Vec<&'a User>) -> Option<&'a User> {
    let index = pool
        .iter()
        .enumerate()
        .min_by(|(ia, a), (ib, b)| {
            parse_price(a.pricing.as_deref())
                .cmp(&parse_price(b.pricing.as_deref()))
                .then(ia.cmp(ib))
        })
        .map(|(i, _)| i)?;
    Some(pool.remove(index))
}

fn take_nearest<'a>(pool: &mut Vec<&'a User>, caller: Coordinates) -> Option<&'a User> {
    let index = pool
        .iter()
        .enumerate()
        .filter_map(|(i, p)| {
            let coords = Coordinates {
                latitude: p.latitude?,
                longitude: p.longitude?,
            };
            Some((i, haversine_km(caller, coords)))
        })
        .min_by(|(_, da), (_, db)| da.partial_cmp(db).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)?;
    Some(pool.remove(index))
}

/// Lowest integer appearing in a pricing description ("A partir de R$ 80"
/// parses as 80). Missing or numberless text ranks last.
pub fn parse_price(pricing: Option<&str>) -> i64 {
    let Some(text) = pricing else {
        return UNPRICED;
    };

    let mut lowest: Option<i64> = None;
    let mut current: Option<i64> = None;

    for c in text.chars() {
        if let Some(digit) = c.to_digit(10) {
            current = Some(current.unwrap_or(0) * 10 + i64::from(digit));
        } else if let Some(value) = current.take() {
            lowest = Some(lowest.map_or(value, |l| l.min(value)));
        }
    }
    if let Some(value) = current {
        lowest = Some(lowest.map_or(value, |l| l.min(value)));
    }

    lowest.unwrap_or(UNPRICED)
}

/// Great-circle distance between two points.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{now_iso, UserRole, UserStatus};

    fn professional(
        id: &str,
        services: &[&str],
        rating: f64,
        pricing: Option<&str>,
        coords: Option<(f64, f64)>,
    ) -> User {
        let now = now_iso();
        User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            password_hash: "x".to_string(),
            name: id.to_string(),
            nickname: None,
            role: UserRole::Professional,
            phone: String::new(),
            street: String::new(),
            neighborhood: String::new(),
            city: String::new(),
            state: String::new(),
            region_id: 1,
            is_profile_complete: true,
            status: UserStatus::Approved,
            latitude: coords.map(|(lat, _)| lat),
            longitude: coords.map(|(_, lon)| lon),
            services: services.iter().map(|s| s.to_string()).collect(),
            cpf_cnpj: None,
            bio: None,
            rating: Some(rating),
            reviews_count: Some(1),
            pricing: pricing.map(|s| s.to_string()),
            services_change_request: None,
            profile_change_request: None,
            balance_tc: 0.0,
            balance_brl: 0.0,
            transactions: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    fn wanted(categories: &[&str]) -> Vec<String> {
        categories.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn picks_rated_then_price_then_next_rated_without_location() {
        let pros = vec![
            professional("a", &["Encanador"], 3.0, Some("R$ 80"), None),
            professional("b", &["Encanador"], 5.0, Some("R$ 120"), None),
            professional("c", &["Encanador"], 4.0, Some("R$ 50"), None),
            professional("d", &["Encanador"], 2.0, None, None),
            professional("e", &["Encanador"], 4.5, Some("R$ 60"), None),
        ];

        let picks = recommend(&pros, &wanted(&["Encanador"]), None);
        assert_eq!(picks.len(), 3);
        assert_eq!(picks[0].professional.id, "b");
        assert_eq!(picks[0].badge, TOP_RATED);
        assert_eq!(picks[1].professional.id, "c");
        assert_eq!(picks[1].badge, BEST_PRICE);
        assert_eq!(picks[2].professional.id, "e");
        assert_eq!(picks[2].badge, RECOMMENDED);
    }

    #[test]
    fn rating_ties_keep_input_order() {
        let pros = vec![
            professional("first", &["Pintor"], 5.0, None, None),
            professional("second", &["Pintor"], 5.0, None, None),
        ];
        let picks = recommend(&pros, &wanted(&["Pintor"]), None);
        assert_eq!(picks[0].professional.id, "first");
    }

    #[test]
    fn no_matching_category_yields_empty_result() {
        let pros = vec![professional("a", &["Pintor"], 5.0, None, None)];
        let picks = recommend(&pros, &wanted(&["Chaveiro"]), None);
        assert!(picks.is_empty());
    }

    #[test]
    fn nearest_slot_uses_distance_when_location_is_known() {
        let caller = Coordinates {
            latitude: -23.5505,
            longitude: -46.6333,
        };
        let pros = vec![
            professional("rated", &["Encanador"], 5.0, Some("R$ 200"), None),
            professional("cheap", &["Encanador"], 3.0, Some("R$ 10"), None),
            // Rio de Janeiro
            professional("far", &["Encanador"], 4.0, None, Some((-22.9068, -43.1729))),
            // A few blocks away
            professional("near", &["Encanador"], 3.5, None, Some((-23.5614, -46.6553))),
        ];

        let picks = recommend(&pros, &wanted(&["Encanador"]), Some(caller));
        assert_eq!(picks[2].professional.id, "near");
        assert_eq!(picks[2].badge, NEAREST);
    }

    #[test]
    fn unpriced_professionals_sort_last() {
        assert_eq!(parse_price(None), 99999);
        assert_eq!(parse_price(Some("Orçamento sob consulta")), 99999);
        assert_eq!(parse_price(Some("A partir de R$ 80")), 80);
        assert_eq!(parse_price(Some("Entre R$ 120 e R$ 90")), 90);
    }

    #[test]
    fn haversine_matches_known_distance() {
        // São Paulo ↔ Rio de Janeiro is roughly 360 km
        let sp = Coordinates {
            latitude: -23.5505,
            longitude: -46.6333,
        };
        let rio = Coordinates {
            latitude: -22.9068,
            longitude: -43.1729,
        };
        let d = haversine_km(sp, rio);
        assert!((d - 360.0).abs() < 10.0, "got {d}");
    }
}
