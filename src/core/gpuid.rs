use crate::domain::model::PlaceKind;
use crate::domain::ports::{GeneratedGpuid, GpuidRequest, IdGenerator};

const GEOHASH_ALPHABET: &[u8] = b"0123456789bcdefghjkmnpqrstuvwxyz";
const SLUG_LENGTH: usize = 8;

/// Default generator: `<prefix><COUNTRY><slug>@<geohash>`, for example
/// `c|FRparis___@u09yc` or `g|FRpailfr__@u09yc2`.
#[derive(Debug, Clone, Default)]
pub struct GpuidGenerator;

impl GpuidGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for GpuidGenerator {
    fn generate(&self, request: &GpuidRequest) -> GeneratedGpuid {
        let name = normalize_name(&request.name);
        let country_code = request.country_code.trim().to_lowercase();
        let precision = match request.kind {
            PlaceKind::Group => 6,
            PlaceKind::Cluster => 5,
        };

        let id = format!(
            "{}{}{}@{}",
            request.kind.prefix(),
            country_code.to_uppercase(),
            slug(&name, request.kind),
            geohash(request.latitude, request.longitude, precision)
        );

        GeneratedGpuid {
            id,
            name,
            latitude: request.latitude,
            longitude: request.longitude,
            country_code,
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn words(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .map(|word| {
            word.chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

// Clusters keep the first word, groups two letters of each of the first words.
fn slug(name: &str, kind: PlaceKind) -> String {
    let words = words(name);
    let raw: String = match kind {
        PlaceKind::Cluster => words.first().cloned().unwrap_or_default(),
        PlaceKind::Group => words
            .iter()
            .filter(|word| word.len() > 2)
            .map(|word| word.chars().take(2).collect::<String>())
            .collect(),
    };

    let mut slug: String = raw.chars().take(SLUG_LENGTH).collect();
    while slug.len() < SLUG_LENGTH {
        slug.push('_');
    }
    slug
}

fn geohash(latitude: f64, longitude: f64, precision: usize) -> String {
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut long_range = (-180.0_f64, 180.0_f64);
    let mut hash = String::with_capacity(precision);
    let mut even_bit = true;
    let mut bit = 0;
    let mut index = 0usize;

    while hash.len() < precision {
        let (range, value) = if even_bit {
            (&mut long_range, longitude)
        } else {
            (&mut lat_range, latitude)
        };
        let middle = (range.0 + range.1) / 2.0;
        if value >= middle {
            index = index * 2 + 1;
            range.0 = middle;
        } else {
            index *= 2;
            range.1 = middle;
        }
        even_bit = !even_bit;

        bit += 1;
        if bit == 5 {
            hash.push(GEOHASH_ALPHABET[index] as char);
            bit = 0;
            index = 0;
        }
    }
    hash
}
