//! Embedded leap-second kernel.
//!
//! Time-correlation data must always be available, without requiring the
//! caller to ship a leap-second file. The service therefore carries the
//! NAIF0012 leap-second kernel as a string constant, writes it to a
//! uniquely named temporary file during construction, loads it through the
//! regular kernel path, and deletes the file again.

use std::sync::atomic::{AtomicU64, Ordering};

/// Contents of the NAIF0012 leap-second kernel (LSK), current through the
/// leap second of 2017-JAN-1.
pub(crate) const NAIF0012_LSK: &str = r"KPL/LSK


LEAPSECONDS KERNEL FILE
===========================================================================

The contents of this file are used by the routine DELTET to compute the
time difference

[1]       DELTA_ET  =  ET - UTC

the increment to be applied to UTC to give ET.

The difference between UTC and TAI,

[2]       DELTA_AT  =  TAI - UTC

is always an integral number of seconds. The value of DELTA_AT was 10
seconds in January 1972, and increases by one each time a leap second
is declared. Combining [1] and [2] gives

[3]       DELTA_ET  =  ET - (TAI - DELTA_AT)

                    =  (ET - TAI) + DELTA_AT

The difference (ET - TAI) is periodic, and is given by

[4]       ET - TAI  =  DELTA_T_A  + K sin E

where DELTA_T_A and K are constant, and E is the eccentric anomaly of the
heliocentric orbit of the Earth-Moon barycenter. Equation [4], which ignores
small-period fluctuations, is accurate to about 0.000030 seconds.

The eccentric anomaly E is given by

[5]       E = M + EB sin M

where M is the mean anomaly, which in turn is given by

[6]       M = M  +  M t
               0     1

where t is the number of ephemeris seconds past J2000.

\begindata

DELTET/DELTA_T_A       =   32.184
DELTET/K               =    1.657D-3
DELTET/EB              =    1.671D-2
DELTET/M               = (  6.239996D0   1.99096871D-7 )

DELTET/DELTA_AT        = ( 10,   @1972-JAN-1
                           11,   @1972-JUL-1
                           12,   @1973-JAN-1
                           13,   @1974-JAN-1
                           14,   @1975-JAN-1
                           15,   @1976-JAN-1
                           16,   @1977-JAN-1
                           17,   @1978-JAN-1
                           18,   @1979-JAN-1
                           19,   @1980-JAN-1
                           20,   @1981-JUL-1
                           21,   @1982-JUL-1
                           22,   @1983-JUL-1
                           23,   @1985-JUL-1
                           24,   @1988-JAN-1
                           25,   @1990-JAN-1
                           26,   @1991-JAN-1
                           27,   @1992-JUL-1
                           28,   @1993-JUL-1
                           29,   @1994-JUL-1
                           30,   @1996-JAN-1
                           31,   @1997-JUL-1
                           32,   @1999-JAN-1
                           33,   @2006-JAN-1
                           34,   @2009-JAN-1
                           35,   @2012-JUL-1
                           36,   @2015-JUL-1
                           37,   @2017-JAN-1 )

\begintext
";

static BOOTSTRAP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A temp-file name unique within and across processes, so concurrently
/// constructed services never clobber each other's bootstrap file.
pub(crate) fn unique_lsk_filename() -> String {
    let n = BOOTSTRAP_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("naif0012-{}-{}.tls", std::process::id(), n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_kernel_has_the_data_block() {
        assert!(NAIF0012_LSK.starts_with("KPL/LSK"));
        assert!(NAIF0012_LSK.contains("\\begindata"));
        assert!(NAIF0012_LSK.contains("37,   @2017-JAN-1"));
    }

    #[test]
    fn bootstrap_filenames_are_unique() {
        let a = unique_lsk_filename();
        let b = unique_lsk_filename();
        assert_ne!(a, b);
        assert!(a.ends_with(".tls"));
    }
}
