#![warn(missing_docs)]
//! Module for uom macros that facilitate the creation of single unit values or vectors of them
/// helper macro to create the units
#[macro_export]
macro_rules! uom_unit_creator {
    ($unit:ident, $unit_type:ident, $val1:expr) => {
        $unit_type::new::<$unit>($val1)
    };
    ($unit:ident, $unit_type:ident, $( $x:expr ),*) => {
        {
            use std::vec::Vec;
            let mut temp_vec = Vec::new();
            $(
                temp_vec.push($unit_type::new::<$unit>($x));
            )*
            temp_vec
        }
    };
}

///macro to create a Length in meter
#[macro_export]
macro_rules! meter {
    ($( $x:expr ),*) =>{
        {
            use uom::si::{f64::Length, length::meter};
            $crate::uom_unit_creator![meter, Length, $( $x ),*]
        }
    };
}
///macro to create a Length in millimeter
#[macro_export]
macro_rules! millimeter {
    ($( $x:expr ),*) =>{
        {
            use uom::si::{f64::Length, length::millimeter};
            $crate::uom_unit_creator![millimeter, Length, $( $x ),*]
        }
    };
}
///macro to create a Length in micrometer
#[macro_export]
macro_rules! micrometer {
    ($( $x:expr ),*) =>{
        {
            use uom::si::{f64::Length, length::micrometer};
            $crate::uom_unit_creator![micrometer, Length, $( $x ),*]
        }
    };
}
///macro to create an angle in radian
#[macro_export]
macro_rules! radian {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Angle, angle::radian};
        $crate::uom_unit_creator![radian, Angle, $( $x ),*]
    }};
}
///macro to create an angle in microradian
#[macro_export]
macro_rules! microradian {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Angle, angle::radian};
        $crate::uom_unit_creator![radian, Angle, $( 1e-6*$x ),*]
    }};
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use uom::si::{angle::radian, length::meter};

    #[test]
    fn microradian_test() {
        let rad = microradian!(60.);
        assert_relative_eq!(rad.get::<radian>(), 6e-5);
    }
    #[test]
    fn micrometer_test() {
        let length = micrometer!(50.0);
        assert_relative_eq!(length.get::<meter>(), 50e-6);
        let lengths = micrometer!(50.0, 200.0);
        assert_eq!(lengths.len(), 2);
        assert_relative_eq!(lengths[1].get::<meter>(), 200e-6);
    }
    #[test]
    fn millimeter_test() {
        assert_relative_eq!(millimeter!(2.0).get::<meter>(), 0.002);
    }
}
