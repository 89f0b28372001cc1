//! Zodiac signs, planets, and degree parsing.
//!
//! Provides the Sign and Planet enums with their glyphs, plus conversion
//! between per-sign degree notation ("9° Aries 35'") and continuous 0-360
//! ecliptic degrees used by the retrograde ruler and transit compiler.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Element {
    Air,
    Fire,
    Water,
    Earth,
    Aether,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl Sign {
    pub const ALL: [Sign; 12] = [
        Sign::Aries,
        Sign::Taurus,
        Sign::Gemini,
        Sign::Cancer,
        Sign::Leo,
        Sign::Virgo,
        Sign::Libra,
        Sign::Scorpio,
        Sign::Sagittarius,
        Sign::Capricorn,
        Sign::Aquarius,
        Sign::Pisces,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Sign::Aries => "Aries",
            Sign::Taurus => "Taurus",
            Sign::Gemini => "Gemini",
            Sign::Cancer => "Cancer",
            Sign::Leo => "Leo",
            Sign::Virgo => "Virgo",
            Sign::Libra => "Libra",
            Sign::Scorpio => "Scorpio",
            Sign::Sagittarius => "Sagittarius",
            Sign::Capricorn => "Capricorn",
            Sign::Aquarius => "Aquarius",
            Sign::Pisces => "Pisces",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Sign::Aries => "♈︎",
            Sign::Taurus => "♉︎",
            Sign::Gemini => "♊︎",
            Sign::Cancer => "♋︎",
            Sign::Leo => "♌︎",
            Sign::Virgo => "♍︎",
            Sign::Libra => "♎︎",
            Sign::Scorpio => "♏︎",
            Sign::Sagittarius => "♐︎",
            Sign::Capricorn => "♑︎",
            Sign::Aquarius => "♒︎",
            Sign::Pisces => "♓︎",
        }
    }

    /// Classical triplicity of the sign.
    pub fn element(&self) -> Element {
        match self {
            Sign::Aries | Sign::Leo | Sign::Sagittarius => Element::Fire,
            Sign::Taurus | Sign::Virgo | Sign::Capricorn => Element::Earth,
            Sign::Gemini | Sign::Libra | Sign::Aquarius => Element::Air,
            Sign::Cancer | Sign::Scorpio | Sign::Pisces => Element::Water,
        }
    }

    pub fn index(&self) -> usize {
        Sign::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// Sign preceding this one in the zodiac, wrapping Aries back to Pisces.
    pub fn previous(&self) -> Sign {
        Sign::ALL[(self.index() + 11) % 12]
    }

    pub fn from_label(name: &str) -> Option<Sign> {
        let lower = name.to_ascii_lowercase();
        Sign::ALL
            .iter()
            .copied()
            .find(|s| s.label().eq_ignore_ascii_case(&lower))
    }
}

/// Sign containing a continuous ecliptic degree, wrapping modulo 360.
pub fn sign_at(continuous_degree: f64) -> Sign {
    let normalized = continuous_degree.rem_euclid(360.0);
    Sign::ALL[(normalized / 30.0).floor() as usize % 12]
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Planet {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Chiron,
}

impl Planet {
    pub fn label(&self) -> &'static str {
        match self {
            Planet::Sun => "Sun",
            Planet::Moon => "Moon",
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
            Planet::Pluto => "Pluto",
            Planet::Chiron => "Chiron",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Planet::Sun => "☉",
            Planet::Moon => "☾",
            Planet::Mercury => "☿",
            Planet::Venus => "♀",
            Planet::Mars => "♂",
            Planet::Jupiter => "♃",
            Planet::Saturn => "♄",
            Planet::Uranus => "♅",
            Planet::Neptune => "♆",
            Planet::Pluto => "♇",
            Planet::Chiron => "⚷",
        }
    }
}

/// A position within a sign, e.g. 9°35' Aries.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ZodiacDegree {
    pub degree: f64,
    pub sign: Sign,
}

impl ZodiacDegree {
    /// Continuous 0-360 degree with Aries 0° as origin.
    pub fn continuous(&self) -> f64 {
        self.sign.index() as f64 * 30.0 + self.degree
    }

    pub fn display(&self) -> String {
        let whole = self.degree.floor();
        let minutes = ((self.degree - whole) * 60.0).round();
        format!("{}° {} {}'", whole as i64, self.sign.label(), minutes as i64)
    }
}

/// Parses degree notation of the form `"9° Aries 35'"`.
pub fn parse_degree(text: &str) -> Result<ZodiacDegree, String> {
    let cleaned = text.replace(['°', '\''], " ");
    let mut parts = cleaned.split_whitespace();
    let degrees: f64 = parts
        .next()
        .ok_or_else(|| format!("empty degree string: {:?}", text))?
        .parse()
        .map_err(|_| format!("bad degree value in {:?}", text))?;
    let sign_name = parts
        .next()
        .ok_or_else(|| format!("missing sign in {:?}", text))?;
    let sign = Sign::from_label(sign_name)
        .ok_or_else(|| format!("unknown sign {:?} in {:?}", sign_name, text))?;
    let minutes: f64 = parts.next().and_then(|m| m.parse().ok()).unwrap_or(0.0);
    Ok(ZodiacDegree {
        degree: degrees + minutes / 60.0,
        sign,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triplicities_partition_the_signs() {
        assert_eq!(Sign::Aries.element(), Element::Fire);
        assert_eq!(Sign::Taurus.element(), Element::Earth);
        assert_eq!(Sign::Libra.element(), Element::Air);
        assert_eq!(Sign::Pisces.element(), Element::Water);
        for element in [Element::Fire, Element::Earth, Element::Air, Element::Water] {
            let count = Sign::ALL.iter().filter(|s| s.element() == element).count();
            assert_eq!(count, 3);
        }
    }

    #[test]
    fn parse_degree_with_minutes() {
        let d = parse_degree("9° Aries 35'").unwrap();
        assert_eq!(d.sign, Sign::Aries);
        assert!((d.degree - (9.0 + 35.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn parse_degree_rejects_unknown_sign() {
        assert!(parse_degree("4° Ophiuchus 0'").is_err());
    }

    #[test]
    fn continuous_degree_offsets_by_sign_index() {
        let d = parse_degree("26° Pisces 49'").unwrap();
        assert!((d.continuous() - (330.0 + 26.0 + 49.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn sign_at_wraps_modulo_360() {
        assert_eq!(sign_at(0.0), Sign::Aries);
        assert_eq!(sign_at(29.9), Sign::Aries);
        assert_eq!(sign_at(30.0), Sign::Taurus);
        assert_eq!(sign_at(359.0), Sign::Pisces);
        assert_eq!(sign_at(-1.0), Sign::Pisces);
        assert_eq!(sign_at(361.0), Sign::Aries);
    }

    #[test]
    fn previous_sign_wraps() {
        assert_eq!(Sign::Aries.previous(), Sign::Pisces);
        assert_eq!(Sign::Taurus.previous(), Sign::Aries);
    }
}
