use jiff::civil::Date;

/// Source of "today" for overdue checks, streaks and creation dates.
pub trait Clock {
    fn today(&self) -> Date;
}

/// Calendar date in the system time zone.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        jiff::Zoned::now().date()
    }
}

/// A clock pinned to one date.
#[cfg(test)]
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub Date);

#[cfg(test)]
impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}
