//! Resonance definitions built from rows of the resonance table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{codes, ErrorInfo, MmrError};

/// Number of bodies participating in a resonance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyCount {
    /// One planet and the asteroid.
    Two,
    /// Two planets and the asteroid.
    Three,
}

impl BodyCount {
    /// Selects the layout from the number of perturbing planets.
    pub fn from_planets(planets: usize) -> Result<Self, MmrError> {
        match planets {
            1 => Ok(BodyCount::Two),
            2 => Ok(BodyCount::Three),
            other => Err(MmrError::Catalog(
                ErrorInfo::new(
                    codes::INVALID_CONFIG,
                    "resonances need one or two perturbing planets",
                )
                .with_context("planets", other.to_string()),
            )),
        }
    }

    /// Column of the reference semi-major axis in a table row.
    pub fn axis_column(self) -> usize {
        match self {
            BodyCount::Two => 4,
            BodyCount::Three => 6,
        }
    }

    /// Number of integer columns preceding the axis column.
    pub fn integer_columns(self) -> usize {
        self.axis_column()
    }
}

/// Integer multipliers of a single participating body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyCoefficients {
    /// Body name (planet name or `A<number>` for asteroids).
    pub name: String,
    /// Multiplier of the mean longitude.
    pub longitude_coeff: i32,
    /// Multiplier of the perihelion longitude.
    pub perihelion_coeff: i32,
}

/// Asteroid participant, carrying the reference axis taken from the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidCoefficients {
    /// Integer multipliers of the asteroid.
    pub body: BodyCoefficients,
    /// Semi-major axis at which the commensurability holds.
    pub axis: f64,
}

/// Mean-motion resonance between an asteroid and one or two planets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "bodies", rename_all = "kebab-case")]
pub enum Resonance {
    /// Planet and asteroid.
    TwoBody {
        /// Perturbing planet.
        planet: BodyCoefficients,
        /// Small body.
        asteroid: AsteroidCoefficients,
    },
    /// Two planets and asteroid.
    ThreeBody {
        /// First perturbing planet.
        first: BodyCoefficients,
        /// Second perturbing planet.
        second: BodyCoefficients,
        /// Small body.
        asteroid: AsteroidCoefficients,
    },
}

impl Resonance {
    /// Builds a resonance from already parsed table integers and axis.
    ///
    /// Two-body layout: `l_planet l_ast p_planet p_ast`.
    /// Three-body layout: `l1 l2 l_ast p1 p2 p_ast`.
    pub fn from_integers(
        planets: &[String],
        integers: &[i32],
        axis: f64,
        asteroid_name: &str,
    ) -> Result<Self, MmrError> {
        let count = BodyCount::from_planets(planets.len())?;
        if integers.len() != count.integer_columns() {
            return Err(MmrError::Catalog(
                ErrorInfo::new(
                    codes::MALFORMED_TABLE_ROW,
                    "unexpected number of resonance integers",
                )
                .with_context("expected", count.integer_columns().to_string())
                .with_context("found", integers.len().to_string()),
            ));
        }
        let body = |name: &str, longitude: i32, perihelion: i32| BodyCoefficients {
            name: name.to_string(),
            longitude_coeff: longitude,
            perihelion_coeff: perihelion,
        };
        Ok(match count {
            BodyCount::Two => Resonance::TwoBody {
                planet: body(&planets[0], integers[0], integers[2]),
                asteroid: AsteroidCoefficients {
                    body: body(asteroid_name, integers[1], integers[3]),
                    axis,
                },
            },
            BodyCount::Three => Resonance::ThreeBody {
                first: body(&planets[0], integers[0], integers[3]),
                second: body(&planets[1], integers[1], integers[4]),
                asteroid: AsteroidCoefficients {
                    body: body(asteroid_name, integers[2], integers[5]),
                    axis,
                },
            },
        })
    }

    /// Returns the participant layout.
    pub fn body_count(&self) -> BodyCount {
        match self {
            Resonance::TwoBody { .. } => BodyCount::Two,
            Resonance::ThreeBody { .. } => BodyCount::Three,
        }
    }

    /// Perturbing planets in table order.
    pub fn planets(&self) -> Vec<&BodyCoefficients> {
        match self {
            Resonance::TwoBody { planet, .. } => vec![planet],
            Resonance::ThreeBody { first, second, .. } => vec![first, second],
        }
    }

    /// The asteroid participant.
    pub fn asteroid(&self) -> &AsteroidCoefficients {
        match self {
            Resonance::TwoBody { asteroid, .. } | Resonance::ThreeBody { asteroid, .. } => {
                asteroid
            }
        }
    }

    /// Name of the asteroid participant.
    pub fn asteroid_name(&self) -> &str {
        &self.asteroid().body.name
    }

    /// Longitude coefficients of all bodies, planets first.
    pub fn longitude_coeffs(&self) -> Vec<i32> {
        let mut coeffs: Vec<i32> = self.planets().iter().map(|b| b.longitude_coeff).collect();
        coeffs.push(self.asteroid().body.longitude_coeff);
        coeffs
    }

    /// Perihelion coefficients of all bodies, planets first.
    pub fn perihelion_coeffs(&self) -> Vec<i32> {
        let mut coeffs: Vec<i32> = self.planets().iter().map(|b| b.perihelion_coeff).collect();
        coeffs.push(self.asteroid().body.perihelion_coeff);
        coeffs
    }
}

impl fmt::Display for Resonance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.planets().iter().map(|b| b.name.as_str()).collect();
        write!(f, "{} {}", names.join(" "), self.asteroid_name())?;
        for coeff in self.longitude_coeffs() {
            write!(f, " {coeff}")?;
        }
        for coeff in self.perihelion_coeffs() {
            write!(f, " {coeff}")?;
        }
        write!(f, " {}", self.asteroid().axis)
    }
}
