mod median;
mod no_improvement;
