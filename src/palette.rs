//! Color palette for signs, planets, and elements.
//!
//! The palette is an immutable lookup injected into each widget. Every key
//! resolves to three precomputed shades; unknown keys fall back to a neutral
//! grey with a warning rather than failing.

use crate::zodiac::{Element, Planet, Sign};
use eframe::egui::Color32;
use std::collections::HashMap;

pub const FALLBACK_GREY: Shades = Shades {
    average: Color32::from_rgb(0x88, 0x88, 0x88),
    lightest: Color32::from_rgb(0xaa, 0xaa, 0xaa),
    darkest: Color32::from_rgb(0x66, 0x66, 0x66),
};

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Shades {
    pub average: Color32,
    pub lightest: Color32,
    pub darkest: Color32,
}

#[derive(Clone, Debug)]
pub struct ColorPalette {
    signs: HashMap<Sign, Shades>,
    planets: HashMap<Planet, Shades>,
    elements: HashMap<Element, Shades>,
}

impl ColorPalette {
    pub fn new(
        signs: HashMap<Sign, Shades>,
        planets: HashMap<Planet, Shades>,
        elements: HashMap<Element, Shades>,
    ) -> Self {
        Self {
            signs,
            planets,
            elements,
        }
    }

    pub fn sign(&self, sign: Sign) -> Shades {
        match self.signs.get(&sign) {
            Some(s) => *s,
            None => {
                log::warn!("no palette entry for sign {}, using grey", sign.label());
                FALLBACK_GREY
            }
        }
    }

    pub fn planet(&self, planet: Planet) -> Shades {
        match self.planets.get(&planet) {
            Some(s) => *s,
            None => {
                log::warn!("no palette entry for planet {}, using grey", planet.label());
                FALLBACK_GREY
            }
        }
    }

    pub fn element(&self, element: Element) -> Shades {
        match self.elements.get(&element) {
            Some(s) => *s,
            None => {
                log::warn!("no palette entry for element {:?}, using grey", element);
                FALLBACK_GREY
            }
        }
    }
}

impl Default for ColorPalette {
    /// The Sataksan palette shipped with the demo data.
    fn default() -> Self {
        let shades = |avg: u32, light: u32, dark: u32| Shades {
            average: hex_u32(avg),
            lightest: hex_u32(light),
            darkest: hex_u32(dark),
        };
        let signs = HashMap::from([
            (Sign::Aries, shades(0xc64742, 0xd4564d, 0xb73f3e)),
            (Sign::Taurus, shades(0x7ba04b, 0x80a24b, 0x6a9849)),
            (Sign::Gemini, shades(0x8a8d76, 0x869785, 0x7f7c65)),
            (Sign::Cancer, shades(0xc5974c, 0xcaa04e, 0xbe8c4e)),
            (Sign::Leo, shades(0xae8524, 0xb18f2e, 0xad7a1c)),
            (Sign::Virgo, shades(0xb67c51, 0xbc9063, 0xa96442)),
            (Sign::Libra, shades(0x82303c, 0x9e5967, 0x741e29)),
            (Sign::Scorpio, shades(0x8b262c, 0x993233, 0x6c1b24)),
            (Sign::Sagittarius, shades(0x6f534c, 0x6a9849, 0x703746)),
            (Sign::Capricorn, shades(0x4f533b, 0x797c44, 0x3e443a)),
            (Sign::Aquarius, shades(0x2482be, 0x4295c7, 0x0e6fb1)),
            (Sign::Pisces, shades(0x277c84, 0x3493aa, 0x156366)),
        ]);
        let planets = HashMap::from([
            (Planet::Sun, shades(0xbdb12c, 0xc3b72f, 0xb3a50b)),
            (Planet::Mercury, shades(0xce9454, 0xd49759, 0xca9350)),
            (Planet::Venus, shades(0x679244, 0x7fa14d, 0x4f8335)),
            (Planet::Moon, shades(0xb7b8b3, 0xb9bab5, 0xb4b5b0)),
            (Planet::Mars, shades(0x8b0b1d, 0x981422, 0x790219)),
            (Planet::Jupiter, shades(0x4d2830, 0x57313c, 0x391e23)),
            (Planet::Saturn, shades(0x131314, 0x161415, 0x0e0f10)),
            (Planet::Uranus, shades(0x1c1214, 0x23191a, 0x0d080b)),
            (Planet::Neptune, shades(0x745a71, 0x6e91bd, 0x6d4252)),
            (Planet::Pluto, shades(0x5d2a30, 0x752b31, 0x3a2c33)),
        ]);
        let elements = HashMap::from([
            (Element::Air, shades(0x9e9421, 0xa59b29, 0x998e17)),
            (Element::Fire, shades(0xc35941, 0xce6a4e, 0xb74e3a)),
            (Element::Water, shades(0x1981be, 0x278dc2, 0x1277b9)),
            (Element::Earth, shades(0x286a4a, 0x57915c, 0x034b3d)),
            (Element::Aether, shades(0xa7bfc4, 0xafc1c5, 0x99bac2)),
        ]);
        Self::new(signs, planets, elements)
    }
}

fn hex_u32(rgb: u32) -> Color32 {
    Color32::from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Parses a `#rrggbb` hex color string.
pub fn parse_hex(text: &str) -> Result<Color32, String> {
    let hex = text.trim_start_matches('#');
    if hex.len() != 6 {
        return Err(format!("bad hex color {:?}", text));
    }
    let value = u32::from_str_radix(hex, 16).map_err(|_| format!("bad hex color {:?}", text))?;
    Ok(hex_u32(value))
}

/// Darkens RGB by `factor` and applies an alpha, for the hatched
/// retrograde bars.
pub fn shade(color: Color32, factor: f32, alpha: f32) -> Color32 {
    let scale = |c: u8| ((c as f32 * factor).round().clamp(0.0, 255.0)) as u8;
    Color32::from_rgba_unmultiplied(
        scale(color.r()),
        scale(color.g()),
        scale(color.b()),
        (alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}

/// Scales RGB by `1 + percent/100`, saturating each channel at 255.
pub fn lighten(color: Color32, percent: f32) -> Color32 {
    let factor = 1.0 + percent / 100.0;
    let scale = |c: u8| ((c as f32 * factor).round().min(255.0)) as u8;
    Color32::from_rgb(scale(color.r()), scale(color.g()), scale(color.b()))
}
