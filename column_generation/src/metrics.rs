use dipstick::*;

metrics! {
    pub COLUMNS_GENERATED : Marker = "columns_generated";
    pub LPS_SOLVED : Marker = "master_lps_solved";
    pub MIPS_SOLVED : Marker = "master_mips_solved";
    pub TIME_IN_PRICING : Timer = "time_in_pricing";
}

/*
Records the time from creation until drop into TIME_IN_PRICING
*/
pub struct PricingTimer {
    handle: dipstick::TimeHandle,
}

impl PricingTimer {
    pub fn new() -> Self {
        PricingTimer {
            handle: TIME_IN_PRICING.start(),
        }
    }
}

impl Drop for PricingTimer {
    fn drop(&mut self) {
        TIME_IN_PRICING.stop(self.handle);
    }
}
