//! Synthetic text for resident names, addresses and inspector notes.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

/// Source of locale-appropriate free text.
///
/// Names must be non-empty whitespace-separated token sequences and addresses
/// must fit on a single line.
pub trait TextProvider {
    fn name(&self, rng: &mut dyn RngCore) -> String;
    fn address(&self, rng: &mut dyn RngCore) -> String;
    fn sentence(&self, rng: &mut dyn RngCore, words: usize) -> String;
}

const FIRST_NAMES: &[&str] = &[
    "Ana", "Lucía", "María", "Carmen", "Pilar", "Rosa", "Elena", "Isabel", "Marta", "Sara",
    "Paula", "Laura", "Inés", "Nuria", "Begoña", "Consuelo", "Encarnación", "Remedios", "Jose",
    "Antonio", "Manuel", "Francisco", "David", "Javier", "Daniel", "Carlos", "Miguel", "Pedro",
    "Ángel", "Rafael", "Fernando", "Jorge", "Luis", "Alberto", "Sergio", "Pablo", "Ramón",
    "Vicente", "Tomás", "Gregorio", "Ezequiel", "Bartolomé", "Eusebio", "Leandro", "Clemente",
    "Ismael", "Jacinto", "Nicanor",
];

const COMPOUND_SECOND: &[&str] = &["José", "Luisa", "Ángeles", "del Carmen", "Manuel", "Antonio"];

const SURNAMES: &[&str] = &[
    "García", "Fernández", "González", "Rodríguez", "López", "Martínez", "Sánchez", "Pérez",
    "Gómez", "Martín", "Jiménez", "Ruiz", "Hernández", "Díaz", "Moreno", "Muñoz", "Álvarez",
    "Romero", "Alonso", "Gutiérrez", "Navarro", "Torres", "Domínguez", "Vázquez", "Ramos",
    "Gil", "Ramírez", "Serrano", "Blanco", "Molina", "Morales", "Suárez", "Ortega", "Delgado",
    "Castro", "Ortiz", "Rubio", "Marín", "Sanz", "Núñez", "Iglesias", "Medina", "Garrido",
    "Cortés", "Castillo", "Santos", "Lozano", "Guerrero", "Cano", "Prieto", "Méndez", "Cruz",
    "Calvo", "Gallego", "Vidal", "León", "Márquez", "Herrera", "Peña", "Flores", "Cabrera",
    "Campos", "Vega", "Fuentes", "Carrasco", "Diez", "Caballero", "Reyes", "Nieto", "Aguilar",
];

const STREET_KINDS: &[&str] = &[
    "Calle", "Avenida", "Camino", "Plaza", "Paseo", "Ronda", "Travesía", "Callejón",
];

const STREET_NAMES: &[&str] = &[
    "Mayor", "del Río", "de la Fuente", "del Pozo", "de las Eras", "Real", "de León",
    "de San Miguel", "del Molino", "de la Iglesia", "del Sol", "de los Huertos", "Nueva",
    "de la Vega", "del Castro", "de Santa Ana", "de la Estación", "de las Bodegas",
];

const WORDS: &[&str] = &[
    "pozo", "caudal", "contador", "lectura", "agua", "riego", "parcela", "bomba", "válvula",
    "tubería", "depósito", "revisión", "correcto", "sin", "incidencias", "medición", "nivel",
    "acuífero", "licencia", "titular", "visita", "técnico", "estado", "sellado", "precinto",
    "verificado", "registro", "conforme", "instalación", "acceso", "arqueta", "tapa", "limpio",
    "normal", "uso", "doméstico", "agrícola", "se", "observa", "el", "la", "de", "en", "con",
    "y", "del", "al", "funcionamiento", "adecuado", "documentación",
];

/// Word-list provider producing Spanish-looking names and notes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanishWordlist;

fn pick<'a>(rng: &mut dyn RngCore, pool: &'a [&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or("")
}

impl TextProvider for SpanishWordlist {
    fn name(&self, rng: &mut dyn RngCore) -> String {
        let mut parts = vec![pick(rng, FIRST_NAMES).to_string()];
        if rng.gen_bool(0.15) {
            parts.push(pick(rng, COMPOUND_SECOND).to_string());
        }
        parts.push(pick(rng, SURNAMES).to_string());
        if rng.gen_bool(0.8) {
            parts.push(pick(rng, SURNAMES).to_string());
        }
        parts.join(" ")
    }

    fn address(&self, rng: &mut dyn RngCore) -> String {
        let number: u16 = rng.gen_range(1..=120);
        let mut address = format!(
            "{} {}, {}",
            pick(rng, STREET_KINDS),
            pick(rng, STREET_NAMES),
            number
        );
        if rng.gen_bool(0.3) {
            let floor: u8 = rng.gen_range(1..=4);
            address.push_str(&format!(", {floor}º"));
        }
        address
    }

    fn sentence(&self, rng: &mut dyn RngCore, words: usize) -> String {
        let mut sentence = (0..words.max(1))
            .map(|_| pick(rng, WORDS))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(first) = sentence.chars().next() {
            let upper: String = first.to_uppercase().collect();
            sentence.replace_range(..first.len_utf8(), &upper);
        }
        sentence.push('.');
        sentence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn names_have_at_least_two_tokens() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..200 {
            let name = SpanishWordlist.name(&mut rng);
            assert!(name.split_whitespace().count() >= 2, "short name: {name}");
            assert!(name.chars().count() >= 3);
        }
    }

    #[test]
    fn addresses_are_single_line() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..200 {
            let address = SpanishWordlist.address(&mut rng);
            assert!(!address.contains('\n'));
            assert!(!address.is_empty());
        }
    }

    #[test]
    fn sentence_is_capitalized_and_terminated() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let sentence = SpanishWordlist.sentence(&mut rng, 10);
        assert_eq!(sentence.split_whitespace().count(), 10);
        assert!(sentence.ends_with('.'));
        assert!(sentence.chars().next().unwrap().is_uppercase());
    }
}
