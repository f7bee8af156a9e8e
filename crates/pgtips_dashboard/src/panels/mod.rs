pub(crate) mod north_star;
