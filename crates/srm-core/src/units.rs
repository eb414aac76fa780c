// srm-core/src/units.rs

use crate::dimension::Dimension;
use uom::si::f64::{
    Area as UomArea, AvailableEnergy as UomAvailableEnergy, Energy as UomEnergy,
    Length as UomLength, Mass as UomMass, MassDensity as UomMassDensity,
    MassRate as UomMassRate, Power as UomPower, Pressure as UomPressure, Ratio as UomRatio,
    SpecificHeatCapacity as UomSpecificHeatCapacity,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Velocity as UomVelocity, Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type SpecEnergy = UomAvailableEnergy;
pub type Energy = UomEnergy;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Density = UomMassDensity;
pub type MassRate = UomMassRate;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type SpecHeat = UomSpecificHeatCapacity;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Velocity = UomVelocity;
pub type Volume = UomVolume;

/// A value in SI base units tagged with its runtime dimension.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measured {
    pub value: f64,
    pub dimension: Dimension,
}

impl Measured {
    pub const fn new(value: f64, dimension: Dimension) -> Self {
        Self { value, dimension }
    }

    pub const fn dimensionless(value: f64) -> Self {
        Self::new(value, Dimension::DIMENSIONLESS)
    }
}

/// Bridge from typed `uom` quantities to runtime `Measured` values.
pub trait Measure {
    const DIMENSION: Dimension;

    /// Value in SI base units.
    fn si_value(&self) -> f64;

    fn measured(&self) -> Measured {
        Measured::new(self.si_value(), Self::DIMENSION)
    }
}

macro_rules! impl_measure {
    ($($ty:ty => $dim:expr),* $(,)?) => {
        $(
            impl Measure for $ty {
                const DIMENSION: Dimension = $dim;

                fn si_value(&self) -> f64 {
                    self.value
                }
            }
        )*
    };
}

impl_measure! {
    Area => Dimension::AREA,
    SpecEnergy => Dimension::SPECIFIC_ENERGY,
    Energy => Dimension::ENERGY,
    Length => Dimension::LENGTH,
    Mass => Dimension::MASS,
    Density => Dimension::DENSITY,
    MassRate => Dimension::MASS_RATE,
    Power => Dimension::POWER,
    Pressure => Dimension::PRESSURE,
    Ratio => Dimension::DIMENSIONLESS,
    SpecHeat => Dimension::SPECIFIC_HEAT,
    Temperature => Dimension::TEMPERATURE,
    Time => Dimension::TIME,
    Velocity => Dimension::VELOCITY,
    Volume => Dimension::VOLUME,
}

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn kpa(v: f64) -> Pressure {
    use uom::si::pressure::kilopascal;
    Pressure::new::<kilopascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn cm(v: f64) -> Length {
    use uom::si::length::centimeter;
    Length::new::<centimeter>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn cm2(v: f64) -> Area {
    use uom::si::area::square_centimeter;
    Area::new::<square_centimeter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}
