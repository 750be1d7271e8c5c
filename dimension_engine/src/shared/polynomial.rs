//! Closed-form polynomial root isolation for degrees up to four.
//!
//! Primitive intersections reduce to low-degree polynomials in the ray
//! parameter `t`: spheres, cones and cylinders are quadratics, the torus is a
//! quartic. Only strictly positive real roots are of interest (hits behind
//! the ray origin are discarded here, once, instead of in every caller).

use crate::core::types::Number;
use smallvec::SmallVec;

/// Roots are insignificant below this magnitude.
const TINY: Number = 1e-12;

pub type Roots = SmallVec<[Number; 4]>;

/// Finds the positive real roots of the polynomial with the given
/// coefficients (`coeffs[i]` multiplies `x^i`), in ascending order.
///
/// Degrees up to four are solved in closed form: the quadratic in its
/// cancellation-stable form, the cubic by Cardano/trigonometric methods, and
/// the quartic by Ferrari's method with the resolvent-cubic root chosen to
/// avoid catastrophic cancellation. Roots of higher-degree polynomials are
/// not supported.
pub fn solve(coeffs: &[Number]) -> Roots {
    let mut roots = Roots::new();

    // Strip vanishing leading coefficients
    let mut degree = coeffs.len().saturating_sub(1);
    while degree > 0 && coeffs[degree].abs() < TINY {
        degree -= 1;
    }

    match degree {
        0 => {}
        1 => solve_linear(coeffs[1], coeffs[0], &mut roots),
        2 => solve_quadratic(coeffs[2], coeffs[1], coeffs[0], &mut roots),
        3 => solve_cubic(coeffs[3], coeffs[2], coeffs[1], coeffs[0], &mut roots),
        4 => {
            solve_quartic(coeffs[4], coeffs[3], coeffs[2], coeffs[1], coeffs[0], &mut roots);
            // The closed-form quartic loses precision in the worst cases;
            // one Newton step against the original polynomial recovers it
            for root in roots.iter_mut() {
                *root = polish(&coeffs[..=4], *root);
            }
        }
        _ => unreachable!("polynomial degree above four"),
    }

    roots.retain(|r| *r > 0.0);
    roots.sort_unstable_by(Number::total_cmp);
    roots
}

fn solve_linear(a: Number, b: Number, roots: &mut Roots) {
    roots.push(-b / a);
}

fn solve_quadratic(a: Number, b: Number, c: Number, roots: &mut Roots) {
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return;
    }

    // q is exact in sign, so neither root suffers cancellation
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    if q.abs() < TINY {
        roots.push(-b / (2.0 * a));
        roots.push(-b / (2.0 * a));
    } else {
        roots.push(q / a);
        roots.push(c / q);
    }
}

fn solve_cubic(a: Number, b: Number, c: Number, d: Number, roots: &mut Roots) {
    // Depress: x = t - b/(3a) turns it into t^3 + p*t + q
    let (b, c, d) = (b / a, c / a, d / a);
    let shift = b / 3.0;
    let p = c - b * b / 3.0;
    let q = d - b * c / 3.0 + 2.0 * b * b * b / 27.0;

    let disc = -(4.0 * p * p * p + 27.0 * q * q);
    if disc > 0.0 {
        // Three distinct real roots: trigonometric method
        let m = 2.0 * (-p / 3.0).sqrt();
        let theta = (3.0 * q / (p * m)).clamp(-1.0, 1.0).acos() / 3.0;
        for k in 0..3 {
            let t = m * Number::cos(theta - 2.0 * std::f64::consts::PI * k as Number / 3.0);
            roots.push(t - shift);
        }
    } else {
        // One real root: Cardano
        let half_q = q / 2.0;
        let r = (half_q * half_q + p * p * p / 27.0).max(0.0).sqrt();
        let u = (-half_q + r).cbrt();
        let t = if u.abs() < TINY {
            (-half_q - r).cbrt()
        } else {
            u - p / (3.0 * u)
        };
        roots.push(t - shift);
    }
}

fn solve_quartic(a: Number, b: Number, c: Number, d: Number, e: Number, roots: &mut Roots) {
    // Depress: x = y - b/(4a) turns it into y^4 + p*y^2 + q*y + r
    let (b, c, d, e) = (b / a, c / a, d / a, e / a);
    let shift = b / 4.0;
    let b2 = b * b;
    let p = c - 3.0 * b2 / 8.0;
    let q = d - b * c / 2.0 + b2 * b / 8.0;
    let r = e - b * d / 4.0 + b2 * c / 16.0 - 3.0 * b2 * b2 / 256.0;

    if q.abs() < TINY {
        // Biquadratic: y^2 solves a plain quadratic
        let mut squares = Roots::new();
        solve_quadratic(1.0, p, r, &mut squares);
        for y2 in squares {
            if y2 >= 0.0 {
                let y = y2.sqrt();
                roots.push(y - shift);
                roots.push(-y - shift);
            }
        }
        return;
    }

    // Ferrari: the quartic factors into two quadratics through any root m of
    // the resolvent cubic; the largest real root keeps s = sqrt(2m) away from
    // zero and the factor coefficients free of cancellation
    let mut resolvent = Roots::new();
    solve_cubic(1.0, p, p * p / 4.0 - r, -q * q / 8.0, &mut resolvent);
    let Some(m) = resolvent
        .into_iter()
        .filter(|m| *m > 0.0)
        .max_by(Number::total_cmp)
    else {
        return;
    };

    let s = (2.0 * m).sqrt();
    let beta = p / 2.0 + m - q / (2.0 * s);
    let gamma = p / 2.0 + m + q / (2.0 * s);

    let mut ys = Roots::new();
    solve_quadratic(1.0, s, beta, &mut ys);
    solve_quadratic(1.0, -s, gamma, &mut ys);
    for y in ys {
        roots.push(y - shift);
    }
}

/// Evaluates the polynomial and its derivative at `x` by Horner's scheme
fn evaluate(coeffs: &[Number], x: Number) -> (Number, Number) {
    let mut value = 0.0;
    let mut deriv = 0.0;
    for &c in coeffs.iter().rev() {
        deriv = deriv * x + value;
        value = value * x + c;
    }
    (value, deriv)
}

/// A single Newton iteration against the original polynomial
fn polish(coeffs: &[Number], x: Number) -> Number {
    let (value, deriv) = evaluate(coeffs, x);
    if deriv.abs() < TINY {
        return x;
    }
    let better = x - value / deriv;
    if better.is_finite() {
        better
    } else {
        x
    }
}
