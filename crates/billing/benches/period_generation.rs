use std::collections::HashSet;

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use leasebook_billing::{
    BillingCadence, PeriodKey, due_date, filter_new_periods, generate_periods, resolve_amounts,
};

fn contract_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

/// Full invoice run for one contract: generate, filter half as already billed,
/// then price and date the rest.
fn bench_invoice_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoice_run");

    for years in [1u32, 5, 25] {
        let end = contract_start()
            .checked_add_months(chrono::Months::new(12 * years))
            .unwrap();
        group.bench_with_input(BenchmarkId::new("monthly", years), &end, |b, &end| {
            b.iter(|| {
                let periods = generate_periods(contract_start(), end, &BillingCadence::Monthly);
                let existing: HashSet<PeriodKey> =
                    periods.iter().step_by(2).map(|p| p.key()).collect();
                let fresh = filter_new_periods(&periods, &existing, end, true);
                for period in &fresh {
                    black_box(resolve_amounts(Decimal::new(1_120_000, 2), true));
                    black_box(due_date(period.start()));
                }
                black_box(fresh.len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_invoice_run);
criterion_main!(benches);
