mod leaky_relu;
