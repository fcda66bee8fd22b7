//! Curated airports and cities used as national reference points.
//!
//! Coordinates are fixed and the catalog is immutable once built. The
//! engine takes a catalog by value so tests can inject small fixtures.

use crate::types::{ReferenceKind, ReferenceLocation, Tier};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceCatalog {
    entries: Vec<ReferenceLocation>,
    promoted_cities: Vec<String>,
}

impl ReferenceCatalog {
    /// `promoted_cities` names secondary cities that may be surfaced ahead
    /// of the selected tier-1 city when strictly closer.
    pub fn new(entries: Vec<ReferenceLocation>, promoted_cities: Vec<String>) -> Self {
        Self {
            entries,
            promoted_cities,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ReferenceLocation] {
        &self.entries
    }

    pub fn of_kind(&self, kind: ReferenceKind) -> impl Iterator<Item = &ReferenceLocation> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    pub fn is_promoted(&self, entry: &ReferenceLocation) -> bool {
        entry.kind == ReferenceKind::City
            && entry.tier != Tier::One
            && self
                .promoted_cities
                .iter()
                .any(|name| name.eq_ignore_ascii_case(&entry.name))
    }

    /// Major Australian airports and cities.
    pub fn australia() -> Self {
        use ReferenceLocation as R;
        use Tier::{One, Three, Two};

        let entries = vec![
            R::airport("Sydney Airport", "SYD", One, -33.9461, 151.1772),
            R::airport("Melbourne Airport", "MEL", One, -37.6733, 144.8433),
            R::airport("Brisbane Airport", "BNE", One, -27.3842, 153.1175),
            R::airport("Perth Airport", "PER", One, -31.9403, 115.9669),
            R::airport("Adelaide Airport", "ADL", One, -34.9450, 138.5306),
            R::airport("Gold Coast Airport", "OOL", Two, -28.1644, 153.5047),
            R::airport("Canberra Airport", "CBR", Two, -35.3069, 149.1950),
            R::airport("Hobart Airport", "HBA", Two, -42.8361, 147.5103),
            R::airport("Darwin Airport", "DRW", Two, -12.4147, 130.8767),
            R::airport("Cairns Airport", "CNS", Two, -16.8858, 145.7553),
            R::airport("Newcastle Airport", "NTL", Two, -32.7950, 151.8344),
            R::airport("Avalon Airport", "AVV", Two, -38.0394, 144.4694),
            R::airport("Sunshine Coast Airport", "MCY", Three, -26.6033, 153.0911),
            R::airport("Townsville Airport", "TSV", Three, -19.2525, 146.7653),
            R::airport("Launceston Airport", "LST", Three, -41.5453, 147.2142),
            R::airport("Ballina Byron Gateway Airport", "BNK", Three, -28.8339, 153.5625),
            R::airport("Coffs Harbour Airport", "CFS", Three, -30.3206, 153.1161),
            R::airport("Port Macquarie Airport", "PQQ", Three, -31.4358, 152.8631),
            R::airport("Albury Airport", "ABX", Three, -36.0678, 146.9581),
            R::airport("Mackay Airport", "MKY", Three, -21.1717, 149.1797),
            R::airport("Rockhampton Airport", "ROK", Three, -23.3819, 150.4753),
            R::airport("Alice Springs Airport", "ASP", Three, -23.8067, 133.9022),
            R::city("Sydney", One, -33.8688, 151.2093),
            R::city("Melbourne", One, -37.8136, 144.9631),
            R::city("Brisbane", One, -27.4698, 153.0251),
            R::city("Perth", One, -31.9505, 115.8605),
            R::city("Adelaide", One, -34.9285, 138.6007),
            R::city("Canberra", Two, -35.2809, 149.1300),
            R::city("Gold Coast", Two, -28.0167, 153.4000),
            R::city("Newcastle", Two, -32.9283, 151.7817),
            R::city("Hobart", Two, -42.8821, 147.3272),
            R::city("Darwin", Two, -12.4634, 130.8456),
            R::city("Sunshine Coast", Two, -26.6500, 153.0667),
            R::city("Wollongong", Two, -34.4278, 150.8931),
            R::city("Geelong", Two, -38.1499, 144.3617),
            R::city("Townsville", Three, -19.2590, 146.8169),
            R::city("Cairns", Three, -16.9186, 145.7781),
            R::city("Toowoomba", Three, -27.5598, 151.9507),
            R::city("Ballarat", Three, -37.5622, 143.8503),
            R::city("Bendigo", Three, -36.7570, 144.2794),
            R::city("Albury", Three, -36.0737, 146.9135),
            R::city("Launceston", Three, -41.4332, 147.1441),
            R::city("Mackay", Three, -21.1411, 149.1861),
            R::city("Rockhampton", Three, -23.3791, 150.5100),
            R::city("Bunbury", Three, -33.3271, 115.6414),
            R::city("Coffs Harbour", Three, -30.2963, 153.1135),
            R::city("Port Macquarie", Three, -31.4333, 152.9000),
        ];

        Self::new(
            entries,
            vec!["Gold Coast".to_string(), "Sunshine Coast".to_string()],
        )
    }
}
